// Expiry Classification
//
// Turns a certificate record and an evaluation time into a signed day-distance
// and an urgency category:
// - Day-distance is computed on calendar dates (UTC)
// - Categories come from an ordered rule table, first match wins
// - Sources use the expiry window to decide which records qualify at all

pub mod category;
pub mod classifier;
pub mod clock;
pub mod window;

pub use category::UrgencyCategory;
pub use classifier::{CategoryRule, DayPredicate, ExpiryClassifier, day_distance};
pub use clock::{Clock, FixedClock, SystemClock};
pub use window::ExpiryWindow;
