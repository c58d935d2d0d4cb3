use ::std::sync::Mutex;
use ::std::sync::PoisonError;

/// Runs the action against the locked value.
///
/// A poisoned lock is recovered. The value is only ever mutated by whole
/// operations, so a panic elsewhere cannot leave it half written.
pub fn with_this_mut<T, F, R>(this: &Mutex<T>, some_action: F) -> R
where
    F: FnOnce(&mut T) -> R,
{
    let mut this_locked = this.lock().unwrap_or_else(PoisonError::into_inner);
    some_action(&mut this_locked)
}

#[cfg(test)]
mod test_with_this_mut {
    use super::*;
    use ::std::sync::Arc;
    use ::std::thread;

    #[test]
    fn it_should_return_the_action_result() {
        let value = Mutex::new(2);

        let result = with_this_mut(&value, |v| {
            *v += 1;
            *v * 10
        });

        assert_eq!(result, 30);
    }

    #[test]
    fn it_should_recover_from_a_poisoned_lock() {
        let value = Arc::new(Mutex::new(5));
        let value_clone = value.clone();

        let _ = thread::spawn(move || {
            let _locked = value_clone.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        let result = with_this_mut(&value, |v| *v);
        assert_eq!(result, 5);
    }
}
