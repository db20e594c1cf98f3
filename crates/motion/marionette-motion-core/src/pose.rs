//! Part-opacity crossfade between mutually exclusive parts.
//!
//! Motions only write part *target* opacities. Every frame the pose picks, in
//! each group, the first part whose target is visible, fades its current
//! opacity up and caps the other parts of the group so the background never
//! shows through by more than a fixed threshold. Linked parts copy the
//! opacity of the part they hang off.

use log::{debug, warn};

use crate::binding::PartHandle;
use crate::blend::{write_part_opacity, write_part_target};
use crate::config::PoseConfig;
use crate::data::PoseData;
use crate::store::ParameterStore;

/// Target opacities above this count as visible.
const VISIBLE_EPSILON: f32 = 0.001;
/// Knee of the piecewise-linear cap applied to hidden parts.
const PHI: f32 = 0.5;
/// Largest background opacity allowed to show through during a crossfade.
const BACK_OPACITY_THRESHOLD: f32 = 0.15;

#[derive(Clone, Debug, PartialEq)]
pub struct PosePart {
    pub part: PartHandle,
    pub links: Vec<PartHandle>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    groups: Vec<Vec<PosePart>>,
    fade_seconds: f32,
}

impl Pose {
    /// Resolve the description against `store` and put every group in its
    /// initial state (see [`Pose::reset`]). Unknown part ids are skipped.
    pub fn from_data<S: ParameterStore + ?Sized>(data: &PoseData, store: &mut S, cfg: &PoseConfig) -> Self {
        let fade_seconds = match data.fade_in_time {
            Some(s) if s >= 0.0 => s,
            _ => cfg.fade_seconds,
        };

        let mut groups = Vec::with_capacity(data.groups.len());
        for group in &data.groups {
            let mut parts = Vec::with_capacity(group.len());
            for item in group {
                let Some(part) = store.part(&item.id) else {
                    warn!("pose part dropped: unknown part '{}'", item.id);
                    continue;
                };
                let links = item
                    .link
                    .iter()
                    .filter_map(|id| {
                        let linked = store.part(id);
                        if linked.is_none() {
                            warn!("pose link dropped: unknown part '{id}'");
                        }
                        linked
                    })
                    .collect();
                write_part_target(store, &part, 1.0);
                parts.push(PosePart { part, links });
            }
            groups.push(parts);
        }

        let pose = Self { groups, fade_seconds };
        pose.reset(store);
        debug!(
            "pose built: {} groups, fade {}s",
            pose.groups.len(),
            pose.fade_seconds
        );
        pose
    }

    pub fn groups(&self) -> &[Vec<PosePart>] {
        &self.groups
    }

    pub fn fade_seconds(&self) -> f32 {
        self.fade_seconds
    }

    /// Show the first part of every group and hide the rest, instantly.
    pub fn reset<S: ParameterStore + ?Sized>(&self, store: &mut S) {
        for group in &self.groups {
            for (i, pose_part) in group.iter().enumerate() {
                let value = if i == 0 { 1.0 } else { 0.0 };
                write_part_opacity(store, &pose_part.part, value);
                write_part_target(store, &pose_part.part, value);
            }
        }
    }

    /// Advance every group's crossfade by `elapsed` seconds (negative values
    /// count as 0), then copy opacities onto linked parts.
    pub fn update(&self, store: &mut dyn ParameterStore, elapsed: f32) {
        let elapsed = elapsed.max(0.0);
        for group in &self.groups {
            self.fade_group(store, elapsed, group);
        }
        self.copy_linked_opacities(store);
    }

    fn fade_group(&self, store: &mut dyn ParameterStore, elapsed: f32, group: &[PosePart]) {
        if group.is_empty() {
            return;
        }

        let mut visible = 0;
        let mut new_opacity = 1.0;
        for (i, pose_part) in group.iter().enumerate() {
            if store.part_target_opacity(&pose_part.part) > VISIBLE_EPSILON {
                visible = i;
                new_opacity = if self.fade_seconds > 0.0 {
                    (store.part_opacity(&pose_part.part) + elapsed / self.fade_seconds).min(1.0)
                } else {
                    1.0
                };
                break;
            }
        }

        for (i, pose_part) in group.iter().enumerate() {
            if i == visible {
                write_part_opacity(store, &pose_part.part, new_opacity);
                continue;
            }
            let mut cap = if new_opacity < PHI {
                new_opacity * (PHI - 1.0) / PHI + 1.0
            } else {
                (1.0 - new_opacity) * PHI / (1.0 - PHI)
            };
            let back_opacity = (1.0 - cap) * (1.0 - new_opacity);
            if back_opacity > BACK_OPACITY_THRESHOLD {
                cap = 1.0 - BACK_OPACITY_THRESHOLD / (1.0 - new_opacity);
            }
            let current = store.part_opacity(&pose_part.part);
            write_part_opacity(store, &pose_part.part, current.min(cap));
        }
    }

    fn copy_linked_opacities(&self, store: &mut dyn ParameterStore) {
        for pose_part in self.groups.iter().flatten() {
            if pose_part.links.is_empty() {
                continue;
            }
            let opacity = store.part_opacity(&pose_part.part);
            for linked in &pose_part.links {
                write_part_opacity(store, linked, opacity);
            }
        }
    }
}
