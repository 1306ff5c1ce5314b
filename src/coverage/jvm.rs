//! Coverage sessions of the compiled target.
//!
//! The execution-data reader hands over one session per test method, named
//! `<testFQN>%%<testMethod>`, with the covered classes and their covered
//! line counts.

use super::CoverageSession;
use crate::errors::{Error, Result};
use crate::unit::Unit;

pub const SESSION_DELIMITER: &str = "%%";

/// Parameter signature of a test method as the class-file decoder renders
/// it. Test methods take no arguments, so session units carry this
/// signature and collide with the decoded method nodes.
pub const TEST_METHOD_SIGNATURE: &str = "()";

/// A session as read from execution data, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JvmSession {
    pub id: String,
    /// Covered class FQN and covered line count.
    pub covered: Vec<(String, u64)>,
}

impl JvmSession {
    pub fn new(id: impl Into<String>, covered: Vec<(String, u64)>) -> Self {
        Self {
            id: id.into(),
            covered,
        }
    }
}

/// Validate a session id and turn covered class names into units.
///
/// Classes with no covered lines are dropped.
pub fn parse_jvm_session(session: &JvmSession) -> Result<CoverageSession> {
    let (class, method) = session
        .id
        .split_once(SESSION_DELIMITER)
        .ok_or_else(|| Error::coverage(format!("session id {:?} has no delimiter", session.id)))?;
    let (class, method) = (class.trim(), method.trim());
    if class.is_empty() || method.is_empty() {
        return Err(Error::coverage(format!(
            "session id {:?} has an empty test class or method",
            session.id
        )));
    }

    let covered = session
        .covered
        .iter()
        .filter(|(_, lines)| *lines > 0)
        .map(|(name, lines)| (Unit::class(name.replace('/', ".")), *lines))
        .collect();

    Ok(CoverageSession {
        id: session.id.clone(),
        test: Unit::method(
            format!("{class}.{method}"),
            Some(TEST_METHOD_SIGNATURE.to_string()),
        ),
        covered,
    })
}
