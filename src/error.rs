use thiserror::Error;

/// Errors that can abort the setup phase. Setup is all-or-nothing: any of
/// these means no pipeline is produced and steady state is never entered.
///
/// Steady-state degradations (a cell polygon falling outside the frame, a
/// stale mask cache) are deliberately *not* represented here — they yield
/// black samples or a one-frame fallback and are reported through the `log`
/// facade instead of the type system.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A boundary-curve description could not be parsed.
    #[error("Invalid curve description: {0}")]
    Format(String),

    /// The parsed curves or layout cannot form a usable screen patch.
    #[error("Degenerate screen geometry: {0}")]
    Geometry(String),
}
