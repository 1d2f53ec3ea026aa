pub mod test_root_stack;
pub mod test_scenarios;
