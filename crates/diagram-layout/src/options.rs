use diagram_core::LayoutDirection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_NODE_WIDTH: f64 = 200.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 80.0;
pub const DEFAULT_GAP: f64 = 40.0;
pub const LAYOUT_MARGIN: f64 = 20.0;
/// Container width assumed when the view has not reported one yet.
pub const DEFAULT_CONTAINER_WIDTH: f64 = 1000.0;

const MIN_NODE_WIDTH: f64 = 140.0;
const MAX_NODE_WIDTH: f64 = 260.0;
const NARROW_CONTAINER_WIDTH: f64 = 600.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Invalid layout dimensions: {0}")]
    InvalidDimensions(String),
    #[error("Layout failed: {0}")]
    Failed(String),
}

/// Parameters of a single layout request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    pub direction: LayoutDirection,
    pub node_width: f64,
    pub node_height: f64,
    /// Separation between neighbouring nodes and between ranks.
    pub gap: f64,
    pub margin: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            direction: LayoutDirection::LeftToRight,
            node_width: DEFAULT_NODE_WIDTH,
            node_height: DEFAULT_NODE_HEIGHT,
            gap: DEFAULT_GAP,
            margin: LAYOUT_MARGIN,
        }
    }
}

impl LayoutOptions {
    /// Derives node width and flow direction from the available horizontal
    /// space: narrow containers stack ranks top to bottom.
    pub fn for_container_width(container_width: f64) -> Self {
        Self::for_viewport(container_width, DEFAULT_NODE_HEIGHT, DEFAULT_GAP)
    }

    pub fn for_viewport(container_width: f64, node_height: f64, gap: f64) -> Self {
        let node_width = (container_width / 5.0)
            .floor()
            .clamp(MIN_NODE_WIDTH, MAX_NODE_WIDTH);
        let direction = if container_width < NARROW_CONTAINER_WIDTH {
            LayoutDirection::TopToBottom
        } else {
            LayoutDirection::LeftToRight
        };

        Self {
            direction,
            node_width,
            node_height,
            gap,
            margin: LAYOUT_MARGIN,
        }
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(LayoutError::InvalidDimensions(format!("{name} = {value}")))
            }
        };
        let non_negative = |name: &str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(LayoutError::InvalidDimensions(format!("{name} = {value}")))
            }
        };

        positive("node_width", self.node_width)?;
        positive("node_height", self.node_height)?;
        non_negative("gap", self.gap)?;
        non_negative("margin", self.margin)
    }

    /// Footprint extent along the flow axis (the axis ranks advance on).
    pub fn rank_extent(&self) -> f64 {
        match self.direction {
            LayoutDirection::LeftToRight => self.node_width,
            LayoutDirection::TopToBottom => self.node_height,
        }
    }

    /// Footprint extent along the axis nodes of one rank are packed on.
    pub fn cross_extent(&self) -> f64 {
        match self.direction {
            LayoutDirection::LeftToRight => self.node_height,
            LayoutDirection::TopToBottom => self.node_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_heuristic_clamps_width() {
        assert_eq!(LayoutOptions::for_container_width(300.0).node_width, 140.0);
        assert_eq!(LayoutOptions::for_container_width(1000.0).node_width, 200.0);
        assert_eq!(LayoutOptions::for_container_width(1004.0).node_width, 200.0);
        assert_eq!(LayoutOptions::for_container_width(4000.0).node_width, 260.0);
    }

    #[test]
    fn test_viewport_heuristic_picks_direction() {
        assert_eq!(
            LayoutOptions::for_container_width(599.0).direction,
            LayoutDirection::TopToBottom
        );
        assert_eq!(
            LayoutOptions::for_container_width(600.0).direction,
            LayoutDirection::LeftToRight
        );
    }

    #[test]
    fn test_validate_rejects_bad_dimensions() {
        assert!(LayoutOptions::default().validate().is_ok());

        let nan_width = LayoutOptions {
            node_width: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            nan_width.validate(),
            Err(LayoutError::InvalidDimensions(_))
        ));

        let negative_gap = LayoutOptions {
            gap: -1.0,
            ..Default::default()
        };
        assert!(negative_gap.validate().is_err());
    }
}
