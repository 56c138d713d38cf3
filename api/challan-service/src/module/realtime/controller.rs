use crate::app::AppState;
use crate::service::realtime_service::{ChangeEvent, EVENT_INSERT};
use crate::service::validation_service::non_blank;
use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream};
use serde::Deserialize;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeQuery {
    pub table: Option<String>,
}

/// Server-sent stream of insert events, optionally limited to one table.
/// Subscribers that fall behind skip events; there is no replay.
pub async fn stream_inserts(
    State(state): State<AppState>,
    Query(query): Query<RealtimeQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let table = non_blank(query.table.as_deref()).map(ToOwned::to_owned);
    let rx = state.feed.subscribe();

    let events = stream::unfold((rx, table), |(mut rx, table)| async move {
        loop {
            match rx.recv().await {
                Ok(change) if wanted(&change, table.as_deref()) => match to_event(&change) {
                    Some(event) => return Some((Ok::<_, Infallible>(event), (rx, table))),
                    None => continue,
                },
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "realtime stream lagged; events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn wanted(change: &ChangeEvent, table: Option<&str>) -> bool {
    change.event_type == EVENT_INSERT && table.map_or(true, |t| change.table == t)
}

fn to_event(change: &ChangeEvent) -> Option<Event> {
    match Event::default().event(change.table.as_str()).json_data(change) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(table = %change.table, error = %e, "failed to encode realtime event");
            None
        }
    }
}
