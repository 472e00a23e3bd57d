use actix_web::web::Bytes;
use serde::Serialize;

/// One typed message for a session's push channel.
#[derive(Debug, Clone)]
pub struct Event<T> {
    pub id: String,
    pub category: String,
    pub payload: T,
}

impl<T: Serialize> Event<T> {
    pub fn new(id: impl Into<String>, category: impl Into<String>, payload: T) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            payload,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to serialize payload of event {id}: {source}")]
pub struct FrameError {
    pub id: String,
    #[source]
    pub source: serde_json::Error,
}

/// Render an event as a server-sent-events frame:
///
/// ```text
/// id: <message-id>
/// event: <category>
/// data: <json>
///
/// ```
///
/// The payload is serialized compactly, so it always fits on one `data:` line.
pub fn frame<T: Serialize>(event: &Event<T>) -> Result<Bytes, FrameError> {
    let data = serde_json::to_string(&event.payload).map_err(|source| FrameError {
        id: event.id.clone(),
        source,
    })?;

    Ok(Bytes::from(format!(
        "id: {}\nevent: {}\ndata: {}\n\n",
        event.id, event.category, data
    )))
}
