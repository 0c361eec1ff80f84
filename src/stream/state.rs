use std::fmt;

/// Payload of a streaming field. Most fields publish numbers; the trend
/// arrow publishes its glyph directly.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSample {
    Number(f64),
    Text(String),
}

impl fmt::Display for FieldSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSample::Number(value) => write!(f, "{value}"),
            FieldSample::Text(text) => write!(f, "{text}"),
        }
    }
}

/// What a host should show for a field right now.
///
/// `Searching` is the initial state before the first evaluation. After
/// that every render tick lands on `Streaming` or `NotAvailable`; there is
/// no terminal state until the stream is stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamState {
    Searching,
    Streaming(FieldSample),
    NotAvailable,
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamState::Searching => write!(f, "searching"),
            StreamState::Streaming(sample) => write!(f, "{sample}"),
            StreamState::NotAvailable => write!(f, "--"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_read_like_a_head_unit() {
        assert_eq!(StreamState::Searching.to_string(), "searching");
        assert_eq!(StreamState::NotAvailable.to_string(), "--");
        assert_eq!(
            StreamState::Streaming(FieldSample::Number(142.0)).to_string(),
            "142"
        );
        assert_eq!(
            StreamState::Streaming(FieldSample::Number(5.5)).to_string(),
            "5.5"
        );
        assert_eq!(
            StreamState::Streaming(FieldSample::Text("↗".to_string())).to_string(),
            "↗"
        );
    }
}
