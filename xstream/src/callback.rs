//! Completion-callback shapes (spec.md §6).
//!
//! The original C callback took a `void *custom` context pointer; per the
//! redesign guidance in spec.md §9 this becomes a trait (or, via the
//! blanket impls below, a plain closure captured at construction). The
//! callback's inputs, outputs, and calling thread are unchanged from the
//! spec: the sender callback is invoked from the sender data thread, the
//! reader callback from the reader data thread.

/// Final disposition of a frame accepted by [`crate::sender::Sender::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenderStatus {
    /// Every fragment was acknowledged.
    Sent,

    /// The frame was abandoned before completion, pre-empted by a newer
    /// flush-marked frame.
    Cancelled,
}

/// Called at most once per frame accepted by the sender, from the sender
/// data thread, handing the frame's payload back to the application.
pub trait SenderCallback: Send + 'static {
    fn on_frame_done(&mut self, status: SenderStatus, payload: Vec<u8>);
}

impl<F> SenderCallback for F
where
    F: FnMut(SenderStatus, Vec<u8>) + Send + 'static,
{
    fn on_frame_done(&mut self, status: SenderStatus, payload: Vec<u8>) {
        self(status, payload)
    }
}

/// Why the reader's completion callback was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderCause {
    /// The reassembly buffer's bitmap is full; `data` holds the frame.
    Complete,

    /// The current buffer cannot hold the frame; the application must
    /// return a buffer of at least `required_size` bytes.
    TooSmall,

    /// The application's larger buffer (returned after `TooSmall`) has
    /// received the copied-over partial data; `data` is empty and the
    /// buffer handed to this call is the old, now-unused one.
    CopyComplete,

    /// The reader is shutting down; the in-progress buffer is returned
    /// without data.
    Cancel,
}

/// One reader completion event.
#[derive(Debug)]
pub struct ReaderEvent<'a> {
    pub cause: ReaderCause,

    /// Valid (and possibly empty) frame bytes when `cause == Complete`.
    /// Empty for every other cause.
    pub data: &'a [u8],

    /// Set when `cause == Complete` and the delivered frame carried the
    /// flush flag.
    pub is_flush: bool,

    /// Frames skipped between the previous completion and this one
    /// (spec.md §4.5 step 4, §8 property 6). Zero outside `Complete`.
    pub skipped_frames: u16,

    /// When `cause == TooSmall`, the minimum buffer capacity, in bytes,
    /// the application must return to avoid the frame being abandoned.
    pub required_size: usize,
}

/// Called from the reader data thread whenever a reassembly event occurs.
/// Returns the buffer to use for the next reassembly target (or, for
/// `TooSmall`, the buffer to retry with). Returning an empty `Vec` is
/// treated as a zero-capacity buffer, not an error — per spec.md §6 "a
/// null buffer is an error"; there is no null `Vec<u8>`, so callers that
/// want to stop receiving should `stop()` the reader instead.
pub trait ReaderCallback: Send + 'static {
    fn on_event(&mut self, event: ReaderEvent<'_>) -> Vec<u8>;
}

impl<F> ReaderCallback for F
where
    F: FnMut(ReaderEvent<'_>) -> Vec<u8> + Send + 'static,
{
    fn on_event(&mut self, event: ReaderEvent<'_>) -> Vec<u8> {
        self(event)
    }
}
