/// Stage of a rendering pass.
///
/// A pass starts the map, then for every layer: prepares it (`LayerStarted`), starts the retrieval
/// (`DataRequested`), and later renders its features (`DataConsumed`) and finishes it (`LayerEnded`). When the whole
/// map is rendered, all layers are prepared before the first one is rendered, so the phases of different layers
/// interleave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderPhase {
    /// Nothing happened yet.
    #[default]
    NotStarted,
    /// The processor was notified about the start of the map.
    MapStarted,
    /// A layer is being prepared.
    LayerStarted,
    /// Retrieval of layer features was started.
    DataRequested,
    /// Features of a layer are being rendered.
    DataConsumed,
    /// A layer is finished or was skipped.
    LayerEnded,
    /// The processor was notified about the end of the map.
    MapEnded,
}

impl RenderPhase {
    /// Returns true if the pass can move from this phase into `next`.
    pub fn can_advance_to(self, next: RenderPhase) -> bool {
        use RenderPhase::*;

        matches!(
            (self, next),
            (NotStarted, MapStarted)
                | (MapStarted, LayerStarted)
                | (MapStarted, MapEnded)
                | (LayerStarted, DataRequested)
                | (LayerStarted, LayerEnded)
                | (DataRequested, LayerStarted)
                | (DataRequested, DataConsumed)
                | (DataConsumed, LayerEnded)
                | (LayerEnded, LayerStarted)
                | (LayerEnded, DataConsumed)
                | (LayerEnded, MapEnded)
        )
    }

    pub(crate) fn advance(&mut self, next: RenderPhase) {
        debug_assert!(
            self.can_advance_to(next),
            "invalid render phase transition {self:?} -> {next:?}"
        );
        log::trace!("Render phase {self:?} -> {next:?}");
        *self = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_map_sequence() {
        use RenderPhase::*;

        let mut phase = RenderPhase::default();
        for next in [
            MapStarted,
            LayerStarted,
            DataRequested,
            LayerStarted,
            LayerEnded,
            LayerStarted,
            DataRequested,
            DataConsumed,
            LayerEnded,
            DataConsumed,
            LayerEnded,
            MapEnded,
        ] {
            phase.advance(next);
        }
        assert_eq!(phase, MapEnded);
    }

    #[test]
    fn invalid_transitions() {
        assert!(!RenderPhase::NotStarted.can_advance_to(RenderPhase::LayerStarted));
        assert!(!RenderPhase::DataRequested.can_advance_to(RenderPhase::MapEnded));
        assert!(!RenderPhase::MapEnded.can_advance_to(RenderPhase::MapStarted));
    }
}
