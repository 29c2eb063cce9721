//! Interceptor-to-threat assignment strategies.
//!
//! One capability, four policies. Every interceptor in the input appears
//! in exactly one assignment; a threat may be assigned more than one
//! interceptor when interceptors outnumber threats.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use bulwark_core::config::AssignmentPolicy;
use bulwark_core::constants::GEOMETRY_EPSILON;
use bulwark_core::entity::{Track, TrackId};
use bulwark_core::queue::PriorityQueue;

/// One interceptor paired with one threat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentItem {
    pub interceptor: TrackId,
    pub threat: TrackId,
}

/// Pairs interceptors against threats. The matching policy is a runtime
/// choice injected at construction, not a type hierarchy.
pub trait AssignmentStrategy {
    fn assign(&self, interceptors: &[Track], threats: &[Track]) -> Vec<AssignmentItem>;
}

/// Instantiate the configured policy.
pub fn strategy_for(policy: AssignmentPolicy) -> Box<dyn AssignmentStrategy + Send + Sync> {
    match policy {
        AssignmentPolicy::RoundRobin => Box::new(RoundRobin),
        AssignmentPolicy::MinDistance => Box::new(MinDistance),
        AssignmentPolicy::MaxClosingSpeed => Box::new(MaxClosingSpeed),
        AssignmentPolicy::ThreatPriority => Box::new(ThreatPriority),
    }
}

/// Pure index cycling: interceptor `i` gets threat `i mod |threats|`.
pub struct RoundRobin;

impl AssignmentStrategy for RoundRobin {
    fn assign(&self, interceptors: &[Track], threats: &[Track]) -> Vec<AssignmentItem> {
        if interceptors.is_empty() || threats.is_empty() {
            return Vec::new();
        }
        interceptors
            .iter()
            .enumerate()
            .map(|(i, interceptor)| AssignmentItem {
                interceptor: interceptor.id,
                threat: threats[i % threats.len()].id,
            })
            .collect()
    }
}

/// Each interceptor independently picks the closest threat; threats may
/// be chosen repeatedly.
pub struct MinDistance;

impl AssignmentStrategy for MinDistance {
    fn assign(&self, interceptors: &[Track], threats: &[Track]) -> Vec<AssignmentItem> {
        if interceptors.is_empty() || threats.is_empty() {
            return Vec::new();
        }
        interceptors
            .iter()
            .map(|interceptor| {
                let threat = threats
                    .iter()
                    .min_by(|a, b| {
                        let da = interceptor.position().distance_squared(a.position());
                        let db = interceptor.position().distance_squared(b.position());
                        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .expect("threats non-empty");
                AssignmentItem {
                    interceptor: interceptor.id,
                    threat: threat.id,
                }
            })
            .collect()
    }
}

/// Each interceptor picks the threat it can run down fastest.
///
/// The score is the intercept speed the interceptor can achieve against
/// that threat: its reference speed plus the threat's closing component
/// along the line of sight, discounted by the time needed to turn onto
/// the line of sight within the normal-acceleration envelope.
pub struct MaxClosingSpeed;

/// Achievable intercept speed for one interceptor/threat pairing.
pub fn intercept_speed(interceptor: &Track, threat: &Track) -> f32 {
    let los = threat.position() - interceptor.position();
    let range = los.length();
    if range < GEOMETRY_EPSILON {
        // Already on top of it.
        return f32::MAX;
    }
    let los_dir = los / range;

    // Positive when the threat is flying toward the interceptor.
    let threat_closing = -threat.velocity().dot(los_dir);

    let speed = interceptor.kinematics.speed();
    let own_speed = speed.max(interceptor.envelope.reference_speed);

    // Time to swing the velocity vector onto the line of sight:
    // turn rate = a_n / v, so t = angle * v / a_n.
    let turn_time = if speed < GEOMETRY_EPSILON {
        0.0
    } else {
        let cos_angle = (interceptor.velocity() / speed).dot(los_dir).clamp(-1.0, 1.0);
        let angle = cos_angle.acos();
        if interceptor.envelope.max_normal < GEOMETRY_EPSILON {
            if angle < 1e-3 {
                0.0
            } else {
                return f32::MIN; // cannot turn at all
            }
        } else {
            angle * speed / interceptor.envelope.max_normal
        }
    };

    (own_speed + threat_closing) / (1.0 + turn_time)
}

impl AssignmentStrategy for MaxClosingSpeed {
    fn assign(&self, interceptors: &[Track], threats: &[Track]) -> Vec<AssignmentItem> {
        if interceptors.is_empty() || threats.is_empty() {
            return Vec::new();
        }
        interceptors
            .iter()
            .map(|interceptor| {
                let threat = threats
                    .iter()
                    .max_by(|a, b| {
                        let sa = intercept_speed(interceptor, a);
                        let sb = intercept_speed(interceptor, b);
                        sa.partial_cmp(&sb).unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .expect("threats non-empty");
                AssignmentItem {
                    interceptor: interceptor.id,
                    threat: threat.id,
                }
            })
            .collect()
    }
}

/// Rank threats by urgency, then deal interceptors across the ranking in
/// priority order, wrapping round-robin when interceptors outnumber
/// threats.
pub struct ThreatPriority;

/// Threat urgency relative to a defended point: closing speed over
/// distance. Higher is more urgent.
pub fn threat_score(threat: &Track, origin: Vec3) -> f32 {
    let los = threat.position() - origin;
    let range = los.length();
    if range < GEOMETRY_EPSILON {
        return f32::MAX;
    }
    let closing = -threat.velocity().dot(los / range);
    closing / range
}

impl AssignmentStrategy for ThreatPriority {
    fn assign(&self, interceptors: &[Track], threats: &[Track]) -> Vec<AssignmentItem> {
        if interceptors.is_empty() || threats.is_empty() {
            return Vec::new();
        }

        // The mean interceptor position stands in for the defended point.
        let origin = interceptors
            .iter()
            .fold(Vec3::ZERO, |acc, t| acc + t.position())
            / interceptors.len() as f32;

        // Min-heap on negated score yields threats most-urgent-first.
        let mut queue = PriorityQueue::new();
        for threat in threats {
            queue.enqueue(threat, -threat_score(threat, origin));
        }
        let mut ranked: Vec<&Track> = Vec::with_capacity(threats.len());
        while let Ok(threat) = queue.dequeue() {
            ranked.push(threat);
        }

        interceptors
            .iter()
            .enumerate()
            .map(|(i, interceptor)| AssignmentItem {
                interceptor: interceptor.id,
                threat: ranked[i % ranked.len()].id,
            })
            .collect()
    }
}
