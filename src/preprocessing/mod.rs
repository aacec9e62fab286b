//! Data preprocessing module
//!
//! Turns raw traffic records into the numeric matrices the classifiers consume:
//! - IP address and flow duration decoding
//! - Label and one-hot encoding
//! - Standard scaling
//! - Stratified train/test splitting

mod encoder;
mod scaler;
mod split;
mod traffic;

pub use encoder::{argmax_rows, one_hot, LabelEncoder, OneHotEncoder};
pub use scaler::StandardScaler;
pub use split::{train_test_split, TrainTestSplit};
pub use traffic::{ip_feature_names, parse_flow_duration, split_ip, IP_FEATURES};
