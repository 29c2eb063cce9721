//! Ballistic launch planning.
//!
//! A precomputed table maps (ground distance, altitude) to the launch
//! angle and flight time that reach that point. The interpolator snaps
//! queries to the nearest tabulated row via a KD-tree; the iterative
//! planner runs a fixed-point search between target prediction and table
//! lookup to find a self-consistent intercept.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use bulwark_core::constants::{
    GEOMETRY_EPSILON, LAUNCH_MAX_ITERATIONS, LAUNCH_TIME_TOLERANCE_SECS,
};
use bulwark_core::{BulwarkError, Result};

use crate::kdtree::KdTree;
use crate::prediction::Predictor;

/// Lookup key: horizontal distance and altitude relative to the launcher,
/// in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchAngleInput {
    pub distance: f32,
    pub altitude: f32,
}

/// Tabulated solution: launch angle in degrees and time to reach the
/// keyed point in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchAngleOutput {
    pub launch_angle_deg: f32,
    pub time_to_position: f32,
}

/// One row of the ballistic table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchAngleDataPoint {
    pub input: LaunchAngleInput,
    pub output: LaunchAngleOutput,
}

/// Parse CSV rows of `distance,altitude,launch_angle,time_to_position`.
/// Blank lines and rows with fewer than 4 numeric columns are silently
/// skipped.
pub fn parse_table(text: &str) -> Vec<LaunchAngleDataPoint> {
    text.lines()
        .filter_map(|line| {
            let fields: Vec<f32> = line
                .split(',')
                .map(str::trim)
                .map_while(|f| f.parse::<f32>().ok())
                .collect();
            if fields.len() < 4 {
                return None;
            }
            Some(LaunchAngleDataPoint {
                input: LaunchAngleInput {
                    distance: fields[0],
                    altitude: fields[1],
                },
                output: LaunchAngleOutput {
                    launch_angle_deg: fields[2],
                    time_to_position: fields[3],
                },
            })
        })
        .collect()
}

/// Nearest-neighbor lookup over the ballistic table.
#[derive(Debug, Clone)]
pub struct LaunchAngleInterpolator {
    tree: KdTree<LaunchAngleDataPoint, 2>,
}

impl LaunchAngleInterpolator {
    /// Fails with `InvalidOperation` when no valid rows are available.
    pub fn new(points: Vec<LaunchAngleDataPoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(BulwarkError::InvalidOperation(
                "launch angle table has no valid rows".into(),
            ));
        }
        let tree = KdTree::build(points, |p| [p.input.distance, p.input.altitude]);
        Ok(Self { tree })
    }

    pub fn from_csv(text: &str) -> Result<Self> {
        Self::new(parse_table(text))
    }

    /// The tabulated row nearest to the query.
    pub fn plan(&self, input: LaunchAngleInput) -> LaunchAngleDataPoint {
        self.tree.nearest([input.distance, input.altitude])
    }

    /// Reconstruct an intercept position from a launcher-relative target
    /// position: the query's azimuth is preserved while distance and
    /// altitude snap to the nearest tabulated combination.
    pub fn intercept_position(&self, relative_target: Vec3) -> Vec3 {
        let flat = Vec3::new(relative_target.x, 0.0, relative_target.z);
        let matched = self.plan(LaunchAngleInput {
            distance: flat.length(),
            altitude: relative_target.y,
        });
        let direction = if flat.length() < GEOMETRY_EPSILON {
            Vec3::Z
        } else {
            flat / flat.length()
        };
        direction * matched.input.distance + Vec3::Y * matched.input.altitude
    }
}

/// Why the planner declined to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaunchRejection {
    /// The fixed-point iteration hit its cap without the times agreeing.
    NotConverged,
    /// Successive target predictions moved away from the candidate
    /// intercept.
    Diverging,
    /// The intercept lies downstream of the launcher along target motion.
    BackwardsLaunch,
}

impl LaunchRejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotConverged => "solver did not converge",
            Self::Diverging => "geometry diverging",
            Self::BackwardsLaunch => "backwards launch",
        }
    }
}

/// The outcome of launch planning. Produced fresh each call; immutable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchPlan {
    pub should_launch: bool,
    pub launch_angle_deg: f32,
    /// Intercept position relative to the launcher.
    pub intercept_position: Vec3,
    /// Set exactly when `should_launch` is false.
    pub rejection: Option<LaunchRejection>,
}

impl LaunchPlan {
    pub fn no_launch(rejection: LaunchRejection) -> Self {
        Self {
            should_launch: false,
            launch_angle_deg: 0.0,
            intercept_position: Vec3::ZERO,
            rejection: Some(rejection),
        }
    }
}

/// Fixed-point solver for a self-consistent intercept.
///
/// Guesses a time-to-intercept, predicts the target there, asks the table
/// for the flight time to that point, and feeds the answer back until the
/// times agree. Non-convergence, a backwards launch, or diverging
/// geometry all produce a no-launch plan rather than an error.
#[derive(Debug, Clone, Copy)]
pub struct IterativeLaunchPlanner {
    pub max_iterations: usize,
    pub tolerance_secs: f32,
}

impl Default for IterativeLaunchPlanner {
    fn default() -> Self {
        Self {
            max_iterations: LAUNCH_MAX_ITERATIONS,
            tolerance_secs: LAUNCH_TIME_TOLERANCE_SECS,
        }
    }
}

impl IterativeLaunchPlanner {
    pub fn plan(
        &self,
        interpolator: &LaunchAngleInterpolator,
        target: &dyn Predictor,
        launcher_position: Vec3,
    ) -> LaunchPlan {
        let mut time = 0.0f32;
        let mut previous_gap: Option<f32> = None;
        let mut solution: Option<(LaunchAngleOutput, Vec3, Vec3)> = None;

        for iteration in 0..self.max_iterations {
            let predicted = target.predict(time);
            let relative = predicted.position - launcher_position;
            let flat = Vec3::new(relative.x, 0.0, relative.z);
            let matched = interpolator.plan(LaunchAngleInput {
                distance: flat.length(),
                altitude: relative.y,
            });
            let intercept = interpolator.intercept_position(relative);

            // If successive target predictions move away from the
            // candidate intercept, the geometry has no real solution.
            let gap = predicted.position.distance(intercept + launcher_position);
            if let Some(previous) = previous_gap {
                if gap > previous {
                    debug!(iteration, gap, "launch geometry diverging");
                    return LaunchPlan::no_launch(LaunchRejection::Diverging);
                }
            }
            previous_gap = Some(gap);

            if (matched.output.time_to_position - time).abs() <= self.tolerance_secs {
                solution = Some((matched.output, intercept, predicted.velocity));
                break;
            }
            time = matched.output.time_to_position;
        }

        let Some((output, intercept, target_velocity)) = solution else {
            debug!(max_iterations = self.max_iterations, "launch solver did not converge");
            return LaunchPlan::no_launch(LaunchRejection::NotConverged);
        };

        // Backwards-launch gate: the intercept must not lie downstream of
        // the launcher along the target's direction of travel.
        let travel = target_velocity.normalize_or_zero();
        if intercept.dot(travel) > 0.0 {
            debug!("rejecting backwards launch");
            return LaunchPlan::no_launch(LaunchRejection::BackwardsLaunch);
        }

        LaunchPlan {
            should_launch: true,
            launch_angle_deg: output.launch_angle_deg,
            intercept_position: intercept,
            rejection: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::LinearExtrapolator;
    use bulwark_core::types::Kinematics;

    fn single_point_table() -> LaunchAngleInterpolator {
        LaunchAngleInterpolator::new(vec![LaunchAngleDataPoint {
            input: LaunchAngleInput {
                distance: 1.0,
                altitude: 100.0,
            },
            output: LaunchAngleOutput {
                launch_angle_deg: 90.0,
                time_to_position: 10.0,
            },
        }])
        .unwrap()
    }

    #[test]
    fn test_parse_table_skips_blank_and_malformed_rows() {
        let text = "\
1000, 200, 45.0, 12.5

not,a,row
2000, 300, 50.0
3000, 400, 55.0, 30.1, extra
";
        let rows = parse_table(text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].input.distance, 1000.0);
        assert_eq!(rows[1].output.time_to_position, 30.1);
    }

    #[test]
    fn test_empty_table_is_invalid_operation() {
        assert!(matches!(
            LaunchAngleInterpolator::from_csv("garbage\n\n"),
            Err(BulwarkError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_plan_returns_nearest_row() {
        let interpolator = LaunchAngleInterpolator::new(parse_table(
            "1000,100,30,8\n5000,500,45,20\n9000,900,60,35\n",
        ))
        .unwrap();
        let matched = interpolator.plan(LaunchAngleInput {
            distance: 5200.0,
            altitude: 450.0,
        });
        assert_eq!(matched.output.launch_angle_deg, 45.0);
    }

    #[test]
    fn test_intercept_position_preserves_azimuth() {
        let interpolator = LaunchAngleInterpolator::new(parse_table("1000,100,30,8\n")).unwrap();
        // Query off-axis: direction (3,0,4)/5 with arbitrary distance/altitude.
        let p = interpolator.intercept_position(Vec3::new(600.0, 250.0, 800.0));
        let expected = Vec3::new(600.0, 100.0, 800.0);
        assert!(p.distance(expected) < 1e-3, "{p:?} != {expected:?}");
    }

    #[test]
    fn test_planner_converges_on_tabulated_intercept() {
        // Target falls from (1, 110, 0) at 1 m/s; it reaches the only
        // tabulated point (distance 1, altitude 100) in exactly 10 s,
        // matching the table's time-to-position.
        let interpolator = single_point_table();
        let target = LinearExtrapolator::new(Kinematics::new(
            Vec3::new(1.0, 110.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::ZERO,
        ));

        let plan = IterativeLaunchPlanner::default().plan(&interpolator, &target, Vec3::ZERO);
        assert!(plan.should_launch);
        assert_eq!(plan.rejection, None);
        assert_eq!(plan.launch_angle_deg, 90.0);
        assert!(plan
            .intercept_position
            .distance(Vec3::new(1.0, 100.0, 0.0))
            < 1e-3);
    }

    #[test]
    fn test_planner_rejects_backwards_launch() {
        // Target past the launcher and flying away: the only tabulated
        // intercept lies downstream of the launcher along its travel.
        let interpolator = single_point_table();
        let target = LinearExtrapolator::new(Kinematics::new(
            Vec3::new(1.0, 90.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::ZERO,
        ));

        let plan = IterativeLaunchPlanner::default().plan(&interpolator, &target, Vec3::ZERO);
        assert!(!plan.should_launch);
        assert_eq!(plan.rejection, Some(LaunchRejection::BackwardsLaunch));
    }

    #[test]
    fn test_planner_reports_no_launch_on_divergence() {
        // Target races away from the tabulated point faster each second.
        let interpolator = single_point_table();
        let target = LinearExtrapolator::new(Kinematics::new(
            Vec3::new(5000.0, 100.0, 0.0),
            Vec3::new(800.0, 0.0, 0.0),
            Vec3::ZERO,
        ));

        let plan = IterativeLaunchPlanner::default().plan(&interpolator, &target, Vec3::ZERO);
        assert!(!plan.should_launch);
        assert_eq!(plan.rejection, Some(LaunchRejection::Diverging));
    }
}
