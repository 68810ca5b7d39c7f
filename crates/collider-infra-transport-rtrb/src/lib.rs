use collider_ports::{LangMessage, LangPort};
use parking_lot::Mutex;
use rtrb::{Consumer, Producer, PushError, RingBuffer};

pub const DEFAULT_CAPACITY: usize = 1024;

/// Sending half of the upward channel. Messages keep their send order;
/// when the ring is full the newest message is dropped.
pub struct RtrbLangPort {
    producer: Mutex<Producer<LangMessage>>,
}

/// Receiving half, drained by whoever relays messages to the language host.
pub struct LangReceiver {
    consumer: Consumer<LangMessage>,
}

pub fn lang_channel(capacity: usize) -> (RtrbLangPort, LangReceiver) {
    let (producer, consumer) = RingBuffer::new(capacity);
    (
        RtrbLangPort {
            producer: Mutex::new(producer),
        },
        LangReceiver { consumer },
    )
}

impl LangPort for RtrbLangPort {
    fn send(&self, msg: LangMessage) {
        let mut producer = self.producer.lock();
        if let Err(PushError::Full(msg)) = producer.push(msg) {
            tracing::warn!(command = ?msg.command_name(), "lang queue full, message dropped");
        }
    }
}

impl LangReceiver {
    pub fn try_recv(&mut self) -> Option<LangMessage> {
        self.consumer.pop().ok()
    }

    pub fn drain(&mut self) -> Vec<LangMessage> {
        let mut messages = Vec::with_capacity(self.consumer.slots());
        while let Ok(msg) = self.consumer.pop() {
            messages.push(msg);
        }
        messages
    }

    pub fn len(&self) -> usize {
        self.consumer.slots()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}
