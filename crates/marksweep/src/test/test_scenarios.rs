// End-to-end collection scenarios

#[cfg(test)]
mod tests {
    use crate::{GcError, GcOption, Runtime};
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    #[test]
    fn test_rooted_objects_survive() {
        let mut rt = Runtime::default();
        let x = rt.allocate_value(123i32).unwrap();
        rt.push(x).unwrap();
        let y = rt.allocate_value(1.23f64).unwrap();
        rt.push(y).unwrap();

        let report = rt.collect();
        assert_eq!(report.collected, 0);
        assert_eq!(report.remaining, 2);
        assert_eq!(report.to_string(), "Collected 0 objects, 2 remaining.");
    }

    #[test]
    fn test_unrooted_object_collected() {
        let mut rt = Runtime::default();
        let z = rt.allocate_value(123i32).unwrap();

        let report = rt.collect();
        assert_eq!(report.collected, 1);
        assert_eq!(report.remaining, 0);
        assert_eq!(report.to_string(), "Collected 1 objects, 0 remaining.");
        assert!(!rt.is_live(z));
    }

    #[test]
    fn test_ninth_allocation_triggers_collection() {
        let mut rt = Runtime::new(GcOption {
            initial_threshold: 8,
            ..Default::default()
        })
        .unwrap();

        let mut objs = Vec::new();
        for i in 0..8 {
            objs.push(rt.allocate_value(i).unwrap());
        }
        assert_eq!(rt.stats().collection_count, 0);
        assert_eq!(rt.live_count(), 8);

        let ninth = rt.allocate_value(8).unwrap();
        assert_eq!(rt.stats().collection_count, 1);
        assert_eq!(rt.stats().objects_collected, 8);
        assert_eq!(rt.live_count(), 1);
        assert!(rt.is_live(ninth));
        assert!(objs.iter().all(|obj| !rt.is_live(*obj)));
    }

    #[test]
    fn test_payload_links_do_not_confer_reachability() {
        // each payload holds the other's blob, outside the object graph
        let blob_a = Rc::new(RefCell::new(vec![1u8]));
        let blob_b = Rc::new(RefCell::new(vec![2u8]));
        let weak_a: Weak<_> = Rc::downgrade(&blob_a);
        let weak_b: Weak<_> = Rc::downgrade(&blob_b);

        let mut rt = Runtime::default();
        let a = rt.allocate_value((blob_a.clone(), blob_b.clone())).unwrap();
        rt.push(a).unwrap();
        let b = rt.allocate_value((blob_b, blob_a)).unwrap();
        rt.push(b).unwrap();

        rt.pop().unwrap();
        rt.pop().unwrap();

        let report = rt.collect();
        assert_eq!(report.collected, 2);
        assert_eq!(report.remaining, 0);
        assert!(weak_a.upgrade().is_none());
        assert!(weak_b.upgrade().is_none());
    }

    #[test]
    fn test_push_past_capacity_overflows() {
        let mut rt = Runtime::default();
        let obj = rt.allocate_value(()).unwrap();

        for _ in 0..256 {
            rt.push(obj).unwrap();
        }
        assert_eq!(rt.push(obj), Err(GcError::StackOverflow { capacity: 256 }));
        assert_eq!(rt.depth(), 256);
    }

    #[test]
    fn test_second_collection_is_idempotent() {
        let mut rt = Runtime::default();
        let kept = rt.allocate_value(0).unwrap();
        rt.push(kept).unwrap();
        rt.allocate_value(1).unwrap();

        assert_eq!(rt.collect().collected, 1);
        let again = rt.collect();
        assert_eq!(again.collected, 0);
        assert_eq!(again.remaining, 1);
    }

    #[test]
    fn test_call_simulation_protocol() {
        // push an argument before "entering" a scope, pop it on exit
        let mut rt = Runtime::default();
        let arg = rt.allocate_value(123).unwrap();
        assert_eq!(rt.collect().collected, 1);
        assert!(!rt.is_live(arg));

        let arg = rt.allocate_value(123).unwrap();
        rt.push(arg).unwrap();
        rt.collect();
        assert!(rt.is_live(arg));
        rt.pop().unwrap();

        // returning the object keeps it rooted for the caller
        rt.push(arg).unwrap();
        assert_eq!(rt.collect().collected, 0);
        assert_eq!(rt.get::<i32>(arg).unwrap(), Some(&123));
    }
}
