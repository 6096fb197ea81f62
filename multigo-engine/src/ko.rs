use serde::{Deserialize, Serialize};

use crate::Point;
use crate::stone::Stone;

/// Ko status. Set only when the previous move captured exactly one stone: that point is
/// closed to the `illegal` color until some other move or pass is played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ko {
    pub pos: Point,
    pub illegal: Stone,
}
