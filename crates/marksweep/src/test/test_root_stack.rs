// Tests for root stack bounds and validation

#[cfg(test)]
mod tests {
    use crate::{GcError, GcOption, RootStack, Runtime};

    #[test]
    fn test_push_pop_is_lifo() {
        let mut rt = Runtime::default();
        let a = rt.allocate_value(1).unwrap();
        rt.push(a).unwrap();
        let b = rt.allocate_value(2).unwrap();
        rt.push(b).unwrap();

        assert_eq!(rt.depth(), 2);
        assert_eq!(rt.peek(), Some(b));
        assert_eq!(rt.pop(), Ok(b));
        assert_eq!(rt.pop(), Ok(a));
        assert_eq!(rt.depth(), 0);
    }

    #[test]
    fn test_pop_empty_underflows() {
        let mut rt = Runtime::default();
        assert_eq!(rt.pop(), Err(GcError::StackUnderflow));
        assert_eq!(rt.peek(), None);
    }

    #[test]
    fn test_push_at_capacity_overflows() {
        let mut rt = Runtime::new(GcOption {
            stack_capacity: 2,
            ..Default::default()
        })
        .unwrap();
        let obj = rt.allocate_value(()).unwrap();
        assert_eq!(rt.capacity(), 2);

        rt.push(obj).unwrap();
        rt.push(obj).unwrap();
        assert_eq!(rt.push(obj), Err(GcError::StackOverflow { capacity: 2 }));
        assert_eq!(rt.depth(), 2);
    }

    #[test]
    fn test_push_stale_reference_rejected() {
        let mut rt = Runtime::default();
        let obj = rt.allocate_value(7u32).unwrap();
        assert_eq!(rt.collect().collected, 1);

        assert_eq!(rt.push(obj), Err(GcError::StaleReference(obj)));
        assert_eq!(rt.depth(), 0);
    }

    #[test]
    fn test_truncate_unwinds_scope() {
        let mut rt = Runtime::default();
        let outer = rt.allocate_value("outer").unwrap();
        rt.push(outer).unwrap();

        let saved = rt.depth();
        for i in 0..3 {
            let local = rt.allocate_value(i).unwrap();
            rt.push(local).unwrap();
        }
        assert_eq!(rt.depth(), 4);

        rt.truncate(saved);
        assert_eq!(rt.roots(), &[outer]);

        let report = rt.collect();
        assert_eq!(report.collected, 3);
        assert!(rt.is_live(outer));
    }

    #[test]
    fn test_root_stack_standalone() {
        let mut rt = Runtime::default();
        let obj = rt.allocate_value(0u8).unwrap();

        let mut stack = RootStack::new(1);
        assert!(stack.is_empty());
        assert_eq!(stack.capacity(), 1);
        stack.push(obj).unwrap();
        assert!(stack.push(obj).is_err());
        assert_eq!(stack.as_slice(), &[obj]);
        stack.clear();
        assert_eq!(stack.pop(), Err(GcError::StackUnderflow));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GcError::StackOverflow { capacity: 256 }.to_string(),
            "Stack overflow! (capacity 256)"
        );
        assert_eq!(GcError::StackUnderflow.to_string(), "Stack underflow!");
    }
}
