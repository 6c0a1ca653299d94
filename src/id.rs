//! Composite resource identifier codec
//!
//! Resources whose remote API has no single natural primary key persist an
//! external id made of several components joined with a colon, e.g.
//! `cluster-a:arn:aws:iam::1:role/x:arn:aws:iam::1:policy/y`.
//!
//! ARNs themselves contain colons, so decoding is ARN-aware: a colon that
//! immediately precedes `arn:` starts a new component. The residual ambiguity
//! (an ARN component followed by a non-ARN component) is a known limitation;
//! `encode` therefore rejects any non-ARN component containing the separator.

use crate::error::LifecycleError;

/// Separator between components of a composite identifier
pub const SEPARATOR: char = ':';

const ARN_PREFIX: &str = "arn:";

/// Join identifier components into a single external id.
///
/// Fails with `Validation` if any component is empty or contains the
/// separator without being an ARN.
pub fn encode(parts: &[&str]) -> Result<String, LifecycleError> {
    for part in parts {
        if part.is_empty() {
            return Err(LifecycleError::Validation(
                "identifier components must not be empty".to_string(),
            ));
        }
        if part.contains(SEPARATOR) && !part.starts_with(ARN_PREFIX) {
            return Err(LifecycleError::Validation(format!(
                "identifier component '{part}' contains '{SEPARATOR}' and is not an ARN"
            )));
        }
    }

    Ok(parts.join(&SEPARATOR.to_string()))
}

/// Split an external id back into exactly `arity` components.
///
/// Fails with `MalformedIdentifier` if the id does not yield exactly `arity`
/// non-empty components.
pub fn decode(id: &str, arity: usize) -> Result<Vec<String>, LifecycleError> {
    let malformed = || LifecycleError::MalformedIdentifier {
        id: id.to_string(),
        expected: arity,
        separator: SEPARATOR,
    };

    // First cut at ARN boundaries: a ':' immediately followed by "arn:".
    let mut chunks: Vec<&str> = Vec::new();
    let mut rest = id;
    while let Some(i) = find_arn_boundary(rest) {
        chunks.push(&rest[..i]);
        rest = &rest[i + 1..];
    }
    chunks.push(rest);

    // Non-ARN components never contain the separator, so any remaining
    // splits all live in the leading chunk.
    let mut parts: Vec<String> = Vec::new();
    if chunks.len() < arity {
        let missing = arity - chunks.len() + 1;
        let head: Vec<&str> = chunks[0].split(SEPARATOR).collect();
        if head.len() != missing {
            return Err(malformed());
        }
        parts.extend(head.iter().map(|s| s.to_string()));
        parts.extend(chunks[1..].iter().map(|s| s.to_string()));
    } else {
        // Exactly arity chunks, and the leading chunk must be a single
        // component: a separator inside it means surplus segments, unless
        // the chunk is itself an ARN.
        if chunks.len() > arity
            || (chunks[0].contains(SEPARATOR) && !chunks[0].starts_with(ARN_PREFIX))
        {
            return Err(malformed());
        }
        parts.extend(chunks.iter().map(|s| s.to_string()));
    }

    if parts.len() != arity || parts.iter().any(|p| p.is_empty()) {
        return Err(malformed());
    }

    Ok(parts)
}

/// Index of the first ':' that starts a new ARN component, skipping the
/// leading `arn:` of the current component.
fn find_arn_boundary(s: &str) -> Option<usize> {
    let start = if s.starts_with(ARN_PREFIX) {
        ARN_PREFIX.len()
    } else {
        0
    };
    s[start..]
        .find(":arn:")
        .map(|i| i + start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_plain_parts() {
        let parts = ["cluster-a", "node-group-b", "0"];
        let id = encode(&parts).unwrap();
        assert_eq!(id, "cluster-a:node-group-b:0");
        assert_eq!(decode(&id, 3).unwrap(), parts);
    }

    #[test]
    fn round_trip_with_arns() {
        let parts = [
            "cluster-a",
            "arn:aws:iam::1:role/x",
            "arn:aws:iam::1:policy/y",
        ];
        let id = encode(&parts).unwrap();
        assert_eq!(id, "cluster-a:arn:aws:iam::1:role/x:arn:aws:iam::1:policy/y");
        assert_eq!(decode(&id, 3).unwrap(), parts);
    }

    #[test]
    fn decode_two_part_arn_id() {
        let id = "cluster-a:arn:aws:iam::1:role/x";
        assert_eq!(
            decode(id, 2).unwrap(),
            vec!["cluster-a", "arn:aws:iam::1:role/x"]
        );
    }

    #[test]
    fn decode_rejects_wrong_arity() {
        assert!(matches!(
            decode("a:b", 3),
            Err(LifecycleError::MalformedIdentifier { expected: 3, .. })
        ));
        assert!(matches!(
            decode("a:b:c:d", 3),
            Err(LifecycleError::MalformedIdentifier { .. })
        ));
        assert!(matches!(
            decode("cluster-a:arn:aws:iam::1:role/x", 3),
            Err(LifecycleError::MalformedIdentifier { .. })
        ));
    }

    #[test]
    fn decode_rejects_surplus_plain_segments() {
        // Extra plain segments must not be swallowed into one component
        assert!(matches!(
            decode("a:b", 1),
            Err(LifecycleError::MalformedIdentifier { expected: 1, .. })
        ));
        assert!(decode("a:b:arn:aws:iam::1:role/x", 2).is_err());
        assert!(decode("a:b:c:arn:aws:iam::1:role/x:arn:aws:iam::1:policy/y", 3).is_err());
        // Surplus ARN components are rejected too
        assert!(decode("arn:aws:iam::1:role/x:arn:aws:iam::1:policy/y", 1).is_err());
        // A single ARN component is still valid at arity 1
        assert_eq!(
            decode("arn:aws:iam::1:role/x", 1).unwrap(),
            vec!["arn:aws:iam::1:role/x"]
        );
    }

    #[test]
    fn decode_rejects_empty_segments() {
        assert!(decode("a::c", 3).is_err());
        assert!(decode(":b:c", 3).is_err());
        assert!(decode("", 1).is_err());
    }

    #[test]
    fn encode_rejects_empty_part() {
        assert!(matches!(
            encode(&["a", "", "c"]),
            Err(LifecycleError::Validation(_))
        ));
    }

    #[test]
    fn encode_rejects_non_arn_part_with_separator() {
        assert!(matches!(
            encode(&["a", "b:c"]),
            Err(LifecycleError::Validation(_))
        ));
        // ARNs are the sanctioned exception
        assert!(encode(&["a", "arn:aws:iam::1:role/x"]).is_ok());
    }
}
