//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
};

use futures::{future::BoxFuture, FutureExt as _, TryFutureExt as _};
use tokio::task::JoinSet;

#[cfg(doc)]
use crate::Task;

/// Background environment for running [`Task`]s.
#[derive(Debug, Default)]
pub struct Background {
    /// Set of spawned tasks.
    tasks: JoinSet<Result<(), Box<dyn Error + Send + 'static>>>,
}

impl Background {
    /// Spawns a new [`Task`] inside the [`Background`] environment.
    pub fn spawn<F, E>(&mut self, future: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Error + Send + 'static,
    {
        _ = self.tasks.spawn(future.map_err(|e| {
            let boxed: Box<dyn Error + Send + 'static> = Box::new(e);
            boxed
        }));
    }
}

impl IntoFuture for Background {
    type Output = Result<(), Box<dyn Error + Send + 'static>>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(mut self) -> Self::IntoFuture {
        async move {
            while let Some(joined) = self.tasks.join_next().await {
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => return Err(e),
                    Err(e) => {
                        let boxed: Box<dyn Error + Send + 'static> =
                            Box::new(e);
                        return Err(boxed);
                    }
                }
            }
            Ok(())
        }
        .boxed()
    }
}
