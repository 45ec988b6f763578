use audio_selector_core::stream::sim::{Sink, Source};
use audio_selector_core::stream::{fires, Framed};
use audio_selector_core::{KeyScript, LedFrame, SelectionController, UiConfig};

/// Plays `snapshots` into the controller, one every 30 ticks, and collects
/// every frame it draws.
fn play(ui: &mut SelectionController, snapshots: &[u32]) -> Sink<LedFrame> {
    let mut source = Source::new();
    for (index, &keys) in snapshots.iter().enumerate() {
        source.push(10 + 30 * index as u64, Framed::single(keys));
    }
    let mut sink = Sink::new();

    let mut settle = 0;
    while settle < 40 {
        let keys = source.present();
        let taken = fires(&keys, ui.keys_ready());
        let out = ui.output();
        let ready = sink.ready();

        ui.tick(keys, None, ready);
        source.tick(taken);
        sink.tick(out);

        if source.is_done() {
            settle += 1;
        }
    }
    sink
}

/// Finds the red and green pixel of one sweep.
fn decode(packet: &[LedFrame]) -> (usize, usize) {
    let mut red = None;
    let mut green = None;
    for (index, frame) in packet.iter().enumerate() {
        assert_eq!(usize::from(frame.addr), index);
        assert_eq!(frame.b, 0, "blue is never used");
        if frame.r != 0 {
            assert!(red.replace(index).is_none(), "two red pixels");
        }
        if frame.g != 0 {
            assert!(green.replace(index).is_none(), "two green pixels");
        }
    }
    (red.expect("a red pixel"), green.expect("a green pixel"))
}

#[test]
fn full_turn_in_both_directions() {
    let script = KeyScript::parse(
        "sw, down, down, down, down, down, down, sw, \
         sw, up, up, up, up, up, up, sw",
    )
    .unwrap();
    let mut ui = SelectionController::new(&UiConfig::default()).unwrap();
    let sink = play(&mut ui, script.snapshots());

    let sweeps: Vec<(usize, usize)> = sink
        .packets()
        .iter()
        .map(|packet| {
            assert_eq!(packet.len(), 8);
            decode(packet)
        })
        .collect();

    assert_eq!(
        sweeps,
        vec![
            (0, 0),
            (0, 4),
            (0, 3),
            (0, 2),
            (0, 1),
            (0, 0),
            (0, 4),
            (4, 4),
            (4, 0),
            (4, 1),
            (4, 2),
            (4, 3),
            (4, 4),
            (4, 0),
        ]
    );
    assert_eq!(ui.sweeps(), 14);
    assert_eq!(ui.selection().channel, 0);
    assert!(!ui.selection().edit_mode);
}

#[test]
fn sweeps_survive_a_slow_ring() {
    let script = KeyScript::parse("sw, up").unwrap();
    let mut ui = SelectionController::new(&UiConfig::default()).unwrap();

    let mut source = Source::new();
    for &keys in script.snapshots() {
        source.push(0, Framed::single(keys));
    }
    let mut sink = Sink::throttled(3);
    for _ in 0..200 {
        let keys = source.present();
        let taken = fires(&keys, ui.keys_ready());
        let out = ui.output();
        let ready = sink.ready();
        ui.tick(keys, None, ready);
        source.tick(taken);
        sink.tick(out);
    }

    let packets = sink.packets();
    assert_eq!(packets.len(), 2);
    assert_eq!(decode(&packets[0]), (0, 0));
    assert_eq!(decode(&packets[1]), (0, 1));
}
