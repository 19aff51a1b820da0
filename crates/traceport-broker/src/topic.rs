//! Topic parsing for the operational-data tree.

use traceport_core::errors::{Result, TraceportError};

/// Extract the product id from a telemetry topic.
///
/// Topics follow `<namespace>/operational_data/<productId>`; the
/// trailing segment is the product id, so publishers may nest extra
/// path levels before it.
///
/// # Errors
///
/// Returns [`TraceportError::InvalidTopic`] for topics with fewer than
/// three segments or an empty product segment.
pub fn product_id_from_topic(topic: &str) -> Result<&str> {
    let segments: Vec<&str> = topic.split('/').collect();
    match segments.as_slice() {
        [_, _, .., product_id] if !product_id.is_empty() => Ok(*product_id),
        _ => Err(TraceportError::InvalidTopic {
            topic: topic.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_topic() {
        assert_eq!(
            product_id_from_topic("dpp/operational_data/prod-42").unwrap(),
            "prod-42"
        );
    }

    #[test]
    fn test_trailing_segment_is_the_product_id() {
        assert_eq!(
            product_id_from_topic("dpp/operational_data/site-1/prod-42").unwrap(),
            "prod-42"
        );
    }

    #[test]
    fn test_short_topics_are_rejected() {
        assert!(product_id_from_topic("dpp").is_err());
        assert!(product_id_from_topic("dpp/operational_data").is_err());
        assert!(product_id_from_topic("").is_err());
    }

    #[test]
    fn test_empty_product_segment_is_rejected() {
        assert!(product_id_from_topic("dpp/operational_data/").is_err());
        assert!(product_id_from_topic("dpp/operational_data/prod-42/").is_err());
    }
}
