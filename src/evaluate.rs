//! Per-frame evaluation of detected subjects against the zones.

use serde::Serialize;

use crate::access::{AccessPolicy, Verdict};
use crate::detect::Subject;
use crate::render::{zone_fill, AlertEvent, ColorClass, SubjectDraw, ZoneDraw};
use crate::store::ZoneStore;
use crate::zone::ZoneType;

/// Verdict and annotation for one subject that was not veiled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub in_restricted: bool,
    pub draw: SubjectDraw,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub frame_index: u64,
    pub subjects: Vec<SubjectDraw>,
    pub alerts: Vec<AlertEvent>,
    /// Subjects dropped because their center fell in a veil zone.
    pub veiled: usize,
}

pub struct FrameEvaluator {
    store: ZoneStore,
    policy: AccessPolicy,
}

impl FrameEvaluator {
    pub fn new(store: ZoneStore, policy: AccessPolicy) -> Self {
        Self { store, policy }
    }

    /// Evaluate one subject. `None` means it sits in a veil zone and must leave no trace.
    ///
    /// Veil and restricted membership are separate store reads; an edit landing between
    /// them is visible to the second read only.
    pub fn evaluate_subject(&self, subject: &Subject) -> Option<Evaluation> {
        if self.store.any_contains(ZoneType::Veil, subject.center) {
            return None;
        }
        let in_restricted = self.store.any_contains(ZoneType::Restricted, subject.center);
        let verdict = self.policy.verdict(&subject.identity, in_restricted);
        Some(Evaluation {
            verdict,
            in_restricted,
            draw: SubjectDraw {
                bbox: subject.bbox,
                label: subject.identity.clone(),
                status: verdict.status(),
                color: ColorClass::for_verdict(verdict),
            },
        })
    }

    pub fn evaluate(&self, frame_index: u64, subjects: &[Subject]) -> FrameReport {
        let mut report = FrameReport {
            frame_index,
            ..FrameReport::default()
        };
        for subject in subjects {
            let Some(evaluation) = self.evaluate_subject(subject) else {
                report.veiled += 1;
                continue;
            };
            if evaluation.verdict.is_violation() {
                report.alerts.push(AlertEvent {
                    identity: subject.identity.clone(),
                    frame_index,
                });
            }
            report.subjects.push(evaluation.draw);
        }
        report
    }

    /// Zone overlay for the current store contents.
    ///
    /// Types are emitted general, restricted, then veil so veils paint over everything.
    /// Within a type the topmost zone (index 0) comes last.
    pub fn zone_draws(&self, edit_mode: bool, active_zone_type: ZoneType) -> Vec<ZoneDraw> {
        let zones = self.store.snapshot();
        let mut draws = Vec::with_capacity(zones.total());
        for zone_type in ZoneType::ALL {
            let highlighted = edit_mode && zone_type == active_zone_type;
            for polygon in zones.get(zone_type).iter().rev() {
                draws.push(ZoneDraw {
                    zone_type,
                    polygon: polygon.clone(),
                    fill: zone_fill(zone_type),
                    edit_highlighted: highlighted,
                });
            }
        }
        draws
    }
}
