//! UI-agnostic state machines behind the weather and contact screens.

pub mod contact;
pub mod weather;

pub use contact::{ContactPresenter, ContactSubmitter, SimulatedSubmitter, SubmissionStatus};
pub use weather::{ViewState, WeatherPresenter};
