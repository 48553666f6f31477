use std::thread::{self, JoinHandle};

use log::warn;

/// Handle to a background candidate load started at mode construction.
///
/// There is no cancellation: a load always runs to completion and is either
/// joined when the mode first needs its candidates or discarded with the
/// mode on shutdown.
pub struct Loader<T> {
    handle: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> Loader<T> {
    pub fn spawn<F>(load: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self {
            handle: Some(thread::spawn(load)),
        }
    }

    /// Block until the load resolves.
    ///
    /// Returns `None` if the load task panicked or was already joined; a
    /// failed load degrades to "no candidates" rather than ending the
    /// session.
    pub fn join(&mut self) -> Option<T> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("background load failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_blocks_until_resolved() {
        let mut loader = Loader::spawn(|| {
            std::thread::sleep(std::time::Duration::from_millis(20));
            vec![1, 2, 3]
        });
        assert_eq!(loader.join(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_join_twice_yields_nothing() {
        let mut loader = Loader::spawn(|| 7);
        assert_eq!(loader.join(), Some(7));
        assert_eq!(loader.join(), None);
    }

    #[test]
    fn test_panicked_load_degrades_to_none() {
        let mut loader: Loader<Vec<String>> = Loader::spawn(|| panic!("load blew up"));
        assert_eq!(loader.join(), None);
    }
}
