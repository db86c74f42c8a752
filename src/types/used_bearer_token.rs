use derivative::Derivative;

use crate::utils::mask_fmt;

/// A struct to hold the used bearer token.
///
/// Used to define the type of the inner bearer token.
#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct UsedBearerToken {
    #[derivative(Debug(format_with = "mask_fmt"))]
    pub value: String,
}
