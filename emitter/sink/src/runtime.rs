use {
    crate::{Result, SinkError},
    std::future::Future,
    tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor},
};

/// Lightweight runtime wrapper to run the async sinks from the synchronous
/// lifecycle callbacks.
#[derive(Debug)]
pub struct RuntimeHandler {
    runtime: Option<Runtime>,
    handle: Handle,
}

impl RuntimeHandler {
    /// Reuse the ambient runtime if there is one, otherwise own a new
    /// multi-threaded runtime.
    ///
    /// An ambient runtime must be multi-threaded, since blocking on it from
    /// within goes through `block_in_place`.
    pub fn new() -> Result<Self> {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => Err(
                SinkError::Runtime("cannot block on a current-thread runtime".to_string()),
            ),
            Ok(handle) => Ok(Self {
                runtime: None,
                handle,
            }),
            Err(_) => {
                let runtime = Builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .map_err(|err| SinkError::Runtime(err.to_string()))?;
                let handle = runtime.handle().clone();
                Ok(Self {
                    runtime: Some(runtime),
                    handle,
                })
            },
        }
    }

    pub fn block_on<F, R>(&self, fut: F) -> R
    where
        F: Future<Output = R>,
    {
        if self.runtime.is_some() {
            self.handle.block_on(fut)
        } else {
            tokio::task::block_in_place(|| self.handle.block_on(fut))
        }
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, assertor::*};

    #[test]
    fn owns_a_runtime_outside_of_tokio() {
        let runtime = RuntimeHandler::new().unwrap();

        assert_that!(runtime.block_on(async { 1 + 1 })).is_equal_to(2);
    }

    #[tokio::test]
    async fn rejects_a_current_thread_runtime() {
        let err = RuntimeHandler::new().unwrap_err();

        assert_that!(matches!(err, SinkError::Runtime(_))).is_true();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reuses_the_ambient_runtime() {
        let runtime = RuntimeHandler::new().unwrap();

        assert_that!(runtime.block_on(async { 40 + 2 })).is_equal_to(42);
    }
}
