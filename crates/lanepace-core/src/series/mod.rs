mod interval;
mod sequencer;

pub use interval::{ladder, pyramid, IntervalSet, LADDER_REST_RATIO, PYRAMID_REST_RATIO};
pub use sequencer::{
    IntervalSequencer, Phase, PhaseChange, SequencerCursor, SequencerState, Transition,
};
