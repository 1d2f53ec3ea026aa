use marksweep::{GcError, GcOption, GcResult, ObjectRef, Runtime};
use std::env;

const VERSION: &str = "marksweep 0.1.0";

fn print_usage() {
    eprintln!("usage: marksweep [options]");
    eprintln!("Available options are:");
    eprintln!("  -n N      allocate N objects (default 16)");
    eprintln!("  -r N      root every N-th allocation, 0 = never (default 0)");
    eprintln!("  -p N      pop N roots after allocating (default 0)");
    eprintln!("  -c N      root stack capacity (default 256)");
    eprintln!("  -t N      initial collection threshold (default 8)");
    eprintln!("  -g N      threshold growth factor (default 2)");
    eprintln!("  -m N      minimum threshold (default 8)");
    eprintln!("  -l        link every allocation to the previous one");
    eprintln!("  -v        show version information");
    eprintln!("  -h        show this help");
}

#[derive(Debug, PartialEq)]
struct Options {
    allocations: usize,
    root_every: usize,
    pops: usize,
    link_chain: bool,
    show_version: bool,
    show_help: bool,
    gc: GcOption,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            allocations: 16,
            root_every: 0,
            pops: 0,
            link_chain: false,
            show_version: false,
            show_help: false,
            gc: GcOption::default(),
        }
    }
}

fn parse_count(args: &[String], i: usize, flag: &str) -> Result<usize, String> {
    let value = args
        .get(i)
        .ok_or_else(|| format!("'{}' needs argument", flag))?;
    value
        .parse::<usize>()
        .map_err(|_| format!("'{}' expects a non-negative integer, got '{}'", flag, value))
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut opts = Options::default();
    let mut i = 1;

    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "-n" | "-r" | "-p" | "-c" | "-t" | "-g" | "-m" => {
                i += 1;
                let value = parse_count(args, i, arg)?;
                match arg {
                    "-n" => opts.allocations = value,
                    "-r" => opts.root_every = value,
                    "-p" => opts.pops = value,
                    "-c" => opts.gc.stack_capacity = value,
                    "-t" => opts.gc.initial_threshold = value,
                    "-g" => opts.gc.growth_factor = value,
                    _ => opts.gc.min_threshold = value,
                }
            }
            "-l" => {
                opts.link_chain = true;
            }
            "-v" => {
                opts.show_version = true;
            }
            "-h" | "--help" => {
                opts.show_help = true;
            }
            _ => {
                return Err(format!("unrecognized option '{}'", arg));
            }
        }
        i += 1;
    }

    Ok(opts)
}

/// Drive one allocation workload against `rt`. Root stack misuse surfaces as
/// an error while the runtime and its heap are still intact.
fn run(rt: &mut Runtime, opts: &Options) -> GcResult<()> {
    let mut prev: Option<ObjectRef> = None;

    for i in 0..opts.allocations {
        let obj = rt.allocate_value(i)?;

        if opts.link_chain
            && let Some(prev) = prev.filter(|prev| rt.is_live(*prev))
        {
            rt.add_reference(obj, prev)?;
        }
        if opts.root_every > 0 && i % opts.root_every == 0 {
            rt.push(obj)?;
        }
        prev = Some(obj);
    }

    for _ in 0..opts.pops {
        rt.pop()?;
    }

    rt.collect();
    Ok(())
}

/// Print one diagnostic and terminate. Exits without running destructors, so
/// the runtime is not torn down after a fatal error.
fn fatal(e: GcError) -> ! {
    eprintln!("marksweep: {}", e);
    std::process::exit(1);
}

fn print_stats(rt: &Runtime) {
    let stats = rt.stats();
    println!("collections:     {}", stats.collection_count);
    println!("  triggered:     {}", stats.triggered_collections);
    println!("allocated:       {}", stats.objects_allocated);
    println!("collected:       {}", stats.objects_collected);
    println!("peak live:       {}", stats.peak_live);
    println!("live:            {}", rt.live_count());
    println!("roots:           {}", rt.depth());
    println!("next threshold:  {}", rt.threshold());
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let opts = match parse_args(&args) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("marksweep: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if opts.show_help {
        print_usage();
        return;
    }
    if opts.show_version {
        println!("{}", VERSION);
        return;
    }

    let mut rt = match Runtime::new(opts.gc.clone()) {
        Ok(rt) => rt,
        Err(e) => fatal(e),
    };
    if let Err(e) = run(&mut rt, &opts) {
        fatal(e);
    }

    print_stats(&rt);
    let report = rt.destroy();
    log::debug!("shutdown: {}", report);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("marksweep")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_defaults() {
        assert_eq!(parse_args(&args(&[])), Ok(Options::default()));
    }

    #[test]
    fn test_parse_all_flags() {
        let opts = parse_args(&args(&[
            "-n", "100", "-r", "3", "-p", "2", "-c", "64", "-t", "4", "-g", "3", "-m", "1", "-l",
        ]))
        .unwrap();
        assert_eq!(opts.allocations, 100);
        assert_eq!(opts.root_every, 3);
        assert_eq!(opts.pops, 2);
        assert!(opts.link_chain);
        assert_eq!(opts.gc.stack_capacity, 64);
        assert_eq!(opts.gc.initial_threshold, 4);
        assert_eq!(opts.gc.growth_factor, 3);
        assert_eq!(opts.gc.min_threshold, 1);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_args(&args(&["-n"])),
            Err("'-n' needs argument".to_string())
        );
        assert!(parse_args(&args(&["-n", "many"])).is_err());
        assert_eq!(
            parse_args(&args(&["-x"])),
            Err("unrecognized option '-x'".to_string())
        );
    }

    fn run_with(list: &[&str]) -> (Runtime, GcResult<()>) {
        let opts = parse_args(&args(list)).unwrap();
        let mut rt = Runtime::new(opts.gc.clone()).unwrap();
        let result = run(&mut rt, &opts);
        (rt, result)
    }

    #[test]
    fn test_run_overflow_keeps_runtime_intact() {
        let (rt, result) = run_with(&["-n", "257", "-r", "1"]);
        assert_eq!(result, Err(GcError::StackOverflow { capacity: 256 }));
        // nothing was torn down before the error reached the caller
        assert_eq!(rt.depth(), 256);
        assert_eq!(rt.live_count(), 257);
    }

    #[test]
    fn test_run_underflow_is_error() {
        let (rt, result) = run_with(&["-n", "2", "-r", "1", "-p", "3"]);
        assert_eq!(result, Err(GcError::StackUnderflow));
        assert_eq!(rt.depth(), 0);
    }

    #[test]
    fn test_run_chain_survives() {
        // only the first allocation is rooted; the chain points back to it
        let (rt, result) = run_with(&["-n", "50", "-r", "1000", "-l"]);
        result.unwrap();
        assert_eq!(rt.depth(), 1);
        assert_eq!(rt.live_count(), 1);
        rt.verify_heap().unwrap();
    }

    #[test]
    fn test_invalid_option_rejected_by_runtime() {
        let opts = parse_args(&args(&["-t", "0"])).unwrap();
        assert!(matches!(
            Runtime::new(opts.gc),
            Err(GcError::InvalidOption(_))
        ));
    }
}
