//! Signal graph
//!
//! Fixed fan-out topology built once per player:
//!
//! ```text
//!            ┌─> gain ──────┐
//! source ────┼─> balance ───┼─> destination
//!            └─> analyser ──┘
//! ```
//!
//! The three branches read the same source in parallel; none depends on the
//! output of another. After construction only node parameters change.

use crate::error::{PlayerError, Result};
use crate::host::{AudioHost, NodeId, NodeParam};
use tracing::{debug, warn};

/// Handles of the nodes making up the player's graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalGraph {
    source: NodeId,
    gain: NodeId,
    balance: NodeId,
    analyser: NodeId,
    destination: NodeId,
}

impl SignalGraph {
    /// Build and wire the topology
    ///
    /// Any host failure is reported as [`PlayerError::AudioHost`]; the caller
    /// treats it as fatal for the instance. Nodes created before the failure
    /// are disconnected and the host is closed.
    pub fn build(host: &mut dyn AudioHost, fft_size: u32) -> Result<Self> {
        let mut created = Vec::with_capacity(4);
        match Self::wire(host, fft_size, &mut created) {
            Ok(graph) => {
                debug!(
                    "Signal graph built: {} bins, fft size {}",
                    host.frequency_bin_count(graph.analyser),
                    fft_size
                );
                Ok(graph)
            }
            Err(e) => {
                warn!(
                    "Signal graph construction failed after {} nodes: {}",
                    created.len(),
                    e
                );
                teardown(host, &created);
                Err(e)
            }
        }
    }

    fn wire(host: &mut dyn AudioHost, fft_size: u32, created: &mut Vec<NodeId>) -> Result<Self> {
        let source = host.create_media_source().map_err(host_error)?;
        created.push(source);
        let gain = host.create_gain().map_err(host_error)?;
        created.push(gain);
        let balance = host.create_stereo_panner().map_err(host_error)?;
        created.push(balance);
        let analyser = host.create_analyser(fft_size).map_err(host_error)?;
        created.push(analyser);

        let graph = Self {
            source,
            gain,
            balance,
            analyser,
            destination: host.destination().map_err(host_error)?,
        };
        for (from, to) in graph.edges() {
            host.connect(from, to).map_err(host_error)?;
        }
        Ok(graph)
    }

    /// Every connection of the topology, source side first
    pub fn edges(&self) -> [(NodeId, NodeId); 6] {
        [
            (self.source, self.gain),
            (self.gain, self.destination),
            (self.source, self.balance),
            (self.balance, self.destination),
            (self.source, self.analyser),
            (self.analyser, self.destination),
        ]
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn gain_node(&self) -> NodeId {
        self.gain
    }

    pub fn balance_node(&self) -> NodeId {
        self.balance
    }

    pub fn analyser(&self) -> NodeId {
        self.analyser
    }

    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// Push a validated gain multiplier
    pub fn set_gain(&self, host: &mut dyn AudioHost, gain: f64) -> Result<()> {
        host.set_param(self.gain, NodeParam::Gain, gain as f32)
    }

    /// Push a validated stereo balance
    pub fn set_balance(&self, host: &mut dyn AudioHost, balance: f64) -> Result<()> {
        host.set_param(self.balance, NodeParam::Pan, balance as f32)
    }

    /// Disconnect every node and close the host
    ///
    /// Teardown keeps going past individual failures so that one refused
    /// disconnect does not leak the rest of the graph.
    pub fn release(self, host: &mut dyn AudioHost) {
        teardown(host, &[self.source, self.gain, self.balance, self.analyser]);
        debug!("Signal graph released");
    }
}

fn teardown(host: &mut dyn AudioHost, nodes: &[NodeId]) {
    for &node in nodes {
        if let Err(e) = host.disconnect(node) {
            warn!("Failed to disconnect node {:?}: {}", node, e);
        }
    }
    if let Err(e) = host.close() {
        warn!("Failed to close audio host: {}", e);
    }
}

fn host_error(err: PlayerError) -> PlayerError {
    match err {
        PlayerError::AudioHost(_) => err,
        other => PlayerError::audio_host(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{NodeKind, SimAudioHost};

    #[test]
    fn builds_parallel_fan_out() {
        let host = SimAudioHost::new();
        let mut handle = host.clone();
        let graph = SignalGraph::build(&mut handle, 2048).unwrap();

        let connections = host.connections();
        assert_eq!(connections.len(), 6);

        // Every processing node is fed by the source, never by a sibling
        for node in [graph.gain_node(), graph.balance_node(), graph.analyser()] {
            assert!(connections.contains(&(graph.source(), node)));
            assert!(connections.contains(&(node, graph.destination())));
            let inputs: Vec<_> = connections.iter().filter(|(_, to)| *to == node).collect();
            assert_eq!(inputs.len(), 1);
        }
        assert_eq!(host.frequency_bin_count(graph.analyser()), 1024);
    }

    #[test]
    fn parameters_reach_their_nodes() {
        let host = SimAudioHost::new();
        let mut handle = host.clone();
        let graph = SignalGraph::build(&mut handle, 2048).unwrap();

        graph.set_gain(&mut handle, 2.5).unwrap();
        graph.set_balance(&mut handle, -0.25).unwrap();

        assert_eq!(host.param(graph.gain_node()), Some(2.5));
        assert_eq!(host.param(graph.balance_node()), Some(-0.25));
    }

    #[test]
    fn unavailable_host_fails_construction() {
        let host = SimAudioHost::unavailable();
        let mut handle = host.clone();
        let err = SignalGraph::build(&mut handle, 2048).unwrap_err();
        assert!(matches!(err, PlayerError::AudioHost(_)));
        assert!(host.connections().is_empty());
    }

    #[test]
    fn partial_construction_closes_host() {
        let host = SimAudioHost::new();
        host.refuse_node(NodeKind::Analyser);
        let mut handle = host.clone();

        let err = SignalGraph::build(&mut handle, 2048).unwrap_err();

        assert!(matches!(err, PlayerError::AudioHost(_)));
        assert_eq!(host.node_count(), 3);
        assert!(host.connections().is_empty());
        assert!(host.is_closed());
    }

    #[test]
    fn release_disconnects_and_closes() {
        let host = SimAudioHost::new();
        let mut handle = host.clone();
        let graph = SignalGraph::build(&mut handle, 2048).unwrap();

        graph.release(&mut handle);

        assert!(host.connections().is_empty());
        assert!(host.is_closed());
    }
}
