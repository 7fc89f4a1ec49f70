// Library surface: keystroke assessment and prompt/session management.
// Rendering and key capture live with the embedding application.
pub mod assessment;
pub mod bounded;
pub mod config;
pub mod error;
pub mod key;
pub mod key_set;
pub mod runtime;
pub mod session;
pub mod util;

pub use assessment::{assess, calc_moving_average, Assessment, AssessmentConst, SpeedScale};
pub use error::{TrainerError, TrainerResult};
pub use key::{is_key_def_match, KeyCapture, KeyDef, RatedKeyDef};
pub use key_set::{KeySetName, KeySource, RandomKeySource};
pub use session::{Session, SessionEvent, Transition};
