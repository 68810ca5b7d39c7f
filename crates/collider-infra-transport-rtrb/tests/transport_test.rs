use collider_infra_transport_rtrb::lang_channel;
use collider_ports::{LangMessage, LangPort};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;

#[test]
fn delivers_in_send_order() {
    let (port, mut receiver) = lang_channel(8);
    port.send(LangMessage::ack("/played", 0));
    port.send(LangMessage::Stream(vec![1, -1]));
    port.send(LangMessage::ack("/paused", 64));

    assert_eq!(receiver.len(), 3);
    assert_eq!(
        receiver.drain(),
        vec![
            LangMessage::ack("/played", 0),
            LangMessage::Stream(vec![1, -1]),
            LangMessage::ack("/paused", 64),
        ]
    );
    assert!(receiver.is_empty());
    assert_eq!(receiver.try_recv(), None);
}

#[test]
fn drops_newest_when_full() {
    let (port, mut receiver) = lang_channel(2);
    port.send(LangMessage::ack("/a", 0));
    port.send(LangMessage::ack("/b", 0));
    port.send(LangMessage::ack("/c", 0));

    let names: Vec<_> = receiver
        .drain()
        .iter()
        .filter_map(|msg| msg.command_name().map(str::to_string))
        .collect();
    assert_eq!(names, vec!["/a".to_string(), "/b".to_string()]);
}

#[test]
fn port_is_shareable_across_threads() {
    let (port, mut receiver) = lang_channel(64);
    let port: Arc<dyn LangPort> = Arc::new(port);

    let sender = Arc::clone(&port);
    thread::spawn(move || {
        for count in 0..10 {
            sender.send(LangMessage::ack("/played", count));
        }
    })
    .join()
    .expect("sender thread panicked");

    let counts: Vec<_> = receiver
        .drain()
        .into_iter()
        .map(|msg| match msg {
            LangMessage::Text(frame) => frame[1].as_u64().unwrap_or(u64::MAX),
            LangMessage::Stream(_) => u64::MAX,
        })
        .collect();
    assert_eq!(counts, (0..10).collect::<Vec<u64>>());
}
