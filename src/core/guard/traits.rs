/*!
 * Guard Traits
 *
 * Core abstractions for RAII resource guards
 */

use super::{GuardMetadata, GuardResult};

/// Core guard trait
///
/// All guards implement this to provide:
/// - Resource type identification
/// - Metadata access
/// - Manual release capability
///
/// Releasing twice is reported as [`GuardError::AlreadyReleased`](super::GuardError)
/// instead of silently freeing a resource some other holder now owns.
pub trait Guard: Send {
    /// Resource type name for logging/debugging
    fn resource_type(&self) -> &'static str;

    /// Get guard metadata
    fn metadata(&self) -> &GuardMetadata;

    /// Check if the guard still holds its resource
    fn is_active(&self) -> bool;

    /// Manually release the resource
    ///
    /// Returns `Err` if already released
    fn release(&mut self) -> GuardResult<()>;
}
