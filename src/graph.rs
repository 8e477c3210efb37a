//! Audio graph - owns nodes and message queues

use alloc::boxed::Box;
use core::marker::PhantomData;

use dasp_graph::{Buffer, Input, NodeData, Processor};
use hashbrown::HashMap;
use petgraph::graph::NodeIndex;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::node::{AudioNode, NodeId, ProcessContext};

/// Default depth of each node's message queue.
pub(crate) const DEFAULT_QUEUE_SIZE: usize = 64;

/// Handle to send messages to a node in an [`AudioGraph`]
pub(crate) struct NodeHandle<M: Send + 'static> {
    pub(crate) id: NodeId,
    pub(crate) sender: Producer<M>,
    pub(crate) _marker: PhantomData<M>,
}

impl<M: Send + 'static> NodeHandle<M> {
    /// Send a message to the node (applied next process cycle)
    ///
    /// Returns Err if the queue is full (message dropped)
    pub fn send(&mut self, msg: M) -> Result<(), M> {
        self.sender.push(msg).map_err(|rtrb::PushError::Full(v)| v)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }
}

// Type-erased wrapper so we can store heterogeneous nodes
trait ErasedNode: Send {
    fn process_erased(&mut self, ctx: &ProcessContext, inputs: &[Input], outputs: &mut [Buffer]);
}

struct NodeWrapper<N: AudioNode> {
    node: N,
    receiver: Consumer<N::Message>,
}

impl<N: AudioNode> ErasedNode for NodeWrapper<N> {
    fn process_erased(&mut self, ctx: &ProcessContext, inputs: &[Input], outputs: &mut [Buffer]) {
        let receiver = &mut self.receiver;
        let node = &mut self.node;

        // drains the queue without allocating
        let messages = core::iter::from_fn(|| receiver.pop().ok());
        node.process(ctx, messages, inputs, outputs);
    }
}

// Adapter for dasp_graph
struct DaspAdapter {
    node: Box<dyn ErasedNode>,
    ctx: ProcessContext,
}

impl dasp_graph::Node for DaspAdapter {
    fn process(&mut self, inputs: &[Input], outputs: &mut [Buffer]) {
        self.node.process_erased(&self.ctx, inputs, outputs);
    }
}

type InnerGraph = petgraph::graph::Graph<NodeData<DaspAdapter>, ()>;

/// An audio processing graph at a fixed sample rate.
///
/// Nodes are only ever added, never removed: tones come and go inside the
/// voice bank, so the topology is fixed once a context is built.
pub(crate) struct AudioGraph {
    graph: InnerGraph,
    processor: Processor<InnerGraph>,
    ctx: ProcessContext,

    node_indices: HashMap<NodeId, NodeIndex>,
    next_node_id: u32,

    terminal: Option<NodeIndex>,
}

impl AudioGraph {
    /// Create a new graph with the given sample rate
    pub fn new(sample_rate: u32) -> Self {
        Self {
            graph: InnerGraph::with_capacity(16, 16),
            processor: Processor::with_capacity(16),
            ctx: ProcessContext {
                sample_rate,
                buffer_size: Buffer::LEN,
            },
            node_indices: HashMap::new(),
            next_node_id: 0,
            terminal: None,
        }
    }

    #[inline]
    pub fn context(&self) -> ProcessContext {
        self.ctx
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Add a node, returns a handle for sending messages
    pub fn add<N: AudioNode>(&mut self, node: N) -> NodeHandle<N::Message> {
        self.add_with_queue_size(node, DEFAULT_QUEUE_SIZE)
    }

    /// Add a node with a custom message queue size
    pub fn add_with_queue_size<N: AudioNode>(&mut self, node: N, queue_size: usize) -> NodeHandle<N::Message> {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let (producer, consumer) = RingBuffer::new(queue_size);

        let num_outputs = node.num_outputs();
        let wrapper = NodeWrapper { node, receiver: consumer };
        let adapter = DaspAdapter {
            node: Box::new(wrapper),
            ctx: self.ctx,
        };

        let node_data = match num_outputs {
            2 => NodeData::new2(adapter),
            // sinks have 0 outputs, but dasp_graph still wants a buffer
            _ => NodeData::new1(adapter),
        };

        let idx = self.graph.add_node(node_data);
        self.node_indices.insert(id, idx);

        NodeHandle {
            id,
            sender: producer,
            _marker: PhantomData,
        }
    }

    /// Connect output of `from` to input of `to`
    pub fn connect(&mut self, from: NodeId, to: NodeId) {
        let from_idx = self.node_indices[&from];
        let to_idx = self.node_indices[&to];
        self.graph.add_edge(from_idx, to_idx, ());
    }

    /// Set which node to process to (typically a sink)
    pub fn set_terminal(&mut self, id: NodeId) {
        self.terminal = Some(self.node_indices[&id]);
    }

    /// The output buffers a node produced during the last `process()`.
    pub fn output_of(&self, id: NodeId) -> Option<&[Buffer]> {
        let idx = self.node_indices.get(&id)?;
        self.graph.node_weight(*idx).map(|data| &data.buffers[..])
    }

    /// Process one block of audio through the graph
    pub fn process(&mut self) {
        if let Some(terminal) = self.terminal {
            self.processor.process(&mut self.graph, terminal);
        }
    }
}
