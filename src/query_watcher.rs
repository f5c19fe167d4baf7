use std::{
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::{GraphQLRequest, QueryEmission, query_executor::QueryExecutor};

/// Interval between poll ticks. Fixed by the page design, not configurable.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Repeatedly issues one query and delivers the settled result of every tick
/// over a channel. The loop is fetch -> emit -> sleep; cancellation happens
/// through the subscription handle.
pub struct PollingQueryWatcher<E> {
    executor: E,
    request: GraphQLRequest,
}

impl<E> PollingQueryWatcher<E>
where
    E: QueryExecutor + Send + Sync + 'static,
{
    pub fn new(executor: E, request: GraphQLRequest) -> Self {
        PollingQueryWatcher { executor, request }
    }

    /// Spawns the poll loop and hands back the subscription. The loop runs
    /// until the subscription is released or its receiver goes away.
    pub fn watch(self) -> LaunchSubscription {
        let (sender, receiver) = mpsc::unbounded_channel();

        let handle = tokio::task::spawn(async move {
            loop {
                let emission = match self.executor.execute(&self.request).await {
                    Ok(response) => {
                        let error = response
                            .errors
                            .as_ref()
                            .filter(|errors| !errors.is_empty())
                            .map(|errors| {
                                errors
                                    .iter()
                                    .map(|e| e.message.clone())
                                    .collect::<Vec<_>>()
                                    .join("; ")
                            });

                        QueryEmission {
                            data: response.data,
                            loading: false,
                            error,
                        }
                    }
                    Err(error) => QueryEmission {
                        data: None,
                        loading: false,
                        error: Some(error),
                    },
                };

                if sender.send(emission).is_err() {
                    tracing::debug!("subscription receiver dropped, stopping poll loop");
                    break;
                }

                tokio::time::sleep(POLL_INTERVAL).await;
            }
        });

        LaunchSubscription {
            receiver,
            abort: handle.abort_handle(),
        }
    }
}

/// Handle to a running poll loop. Dropping it, or calling `unsubscribe`,
/// aborts the loop so no further emissions are delivered.
pub struct LaunchSubscription {
    receiver: mpsc::UnboundedReceiver<QueryEmission>,
    abort: AbortHandle,
}

impl LaunchSubscription {
    /// Next emission, or `None` once the subscription has been released.
    pub async fn recv(&mut self) -> Option<QueryEmission> {
        self.receiver.recv().await
    }

    /// Stops the poll loop and discards anything still buffered. After this
    /// returns, `recv` yields `None` and no callback will ever observe a new
    /// emission.
    pub fn unsubscribe(&mut self) {
        self.abort.abort();
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
    }
}

impl Drop for LaunchSubscription {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

impl Stream for LaunchSubscription {
    type Item = QueryEmission;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}
