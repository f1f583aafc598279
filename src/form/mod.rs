//! Multi-step form core: schema, field state, navigation, validation and submission

pub mod error;
pub mod field;
pub mod progress;
pub mod schema;
pub mod session;
pub mod submission;

pub use error::{SchemaError, SubmitError, SubmitRejected};
pub use field::{FieldEdit, FieldKind, FieldSpec, FieldState};
pub use progress::{Indicator, Progress};
pub use schema::{FormSchema, StepSpec};
pub use session::{EnterAction, FormSession, ERROR_BANNER};
pub use submission::{FormTransport, HttpTransport, SubmissionStatus, SubmitControl};
