// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier

//! Service layer: vote resolution, stats hydration, snapshot aggregation,
//! and the collaborator ports (fitness source, commentary sink).

pub mod commentary;
pub mod fitness;
pub mod snapshot;
pub mod stats;
pub mod votes;

pub use commentary::{CommentaryEvent, CommentarySink, LoggingCommentary};
pub use fitness::{FitnessSource, HttpFitnessSource, NullFitnessSource, WorkoutRecord};
pub use snapshot::{SeasonSnapshot, SnapshotService};
pub use stats::{PlayerSnapshot, SoftError, StatsHydrator};
pub use votes::{CastOutcome, VoteResolutionService, VoteTally};
