use collider_ports::{Frame, InputSpec, LangMessage, ParamSpec, Rate, SynthDefSpec, UnitSpec};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn synthdef_reads_wire_json() {
    let value = json!({
        "name": "tone",
        "consts": [0.0],
        "params": [{ "name": "freq", "default": 440.0 }],
        "units": [
            { "name": "Control", "rate": "Control", "special_index": 0, "inputs": [], "outputs": ["Control"] },
            {
                "name": "SinOsc",
                "rate": "Audio",
                "special_index": 0,
                "inputs": [
                    { "type": "Unit", "unit": 0, "output": 0 },
                    { "type": "Const", "index": 0 }
                ],
                "outputs": ["Audio"]
            }
        ]
    });

    let def = SynthDefSpec::from_json(&value).expect("definition should parse");
    assert_eq!(
        def,
        SynthDefSpec {
            name: "tone".into(),
            consts: vec![0.0],
            params: vec![ParamSpec {
                name: "freq".into(),
                default: 440.0,
            }],
            units: vec![
                UnitSpec {
                    name: "Control".into(),
                    rate: Rate::Control,
                    special_index: 0,
                    inputs: vec![],
                    outputs: vec![Rate::Control],
                },
                UnitSpec {
                    name: "SinOsc".into(),
                    rate: Rate::Audio,
                    special_index: 0,
                    inputs: vec![
                        InputSpec::Unit { unit: 0, output: 0 },
                        InputSpec::Const { index: 0 },
                    ],
                    outputs: vec![Rate::Audio],
                },
            ],
        }
    );
    assert_eq!(def.to_json().expect("definition should serialize"), value);
}

#[test]
fn rate_methods_and_order() {
    assert_eq!(Rate::Scalar.method(), "ir");
    assert_eq!(Rate::Control.method(), "kr");
    assert_eq!(Rate::Audio.method(), "ar");
    assert!(Rate::Audio > Rate::Control && Rate::Control > Rate::Scalar);
}

#[test]
fn frames_and_acks() {
    assert_eq!(
        Frame::text("/play", []),
        Frame::Text(vec![json!("/play")])
    );
    let ack = LangMessage::ack("/played", 128);
    assert_eq!(ack.command_name(), Some("/played"));
    assert_eq!(ack, LangMessage::Text(vec![json!("/played"), json!(128)]));
    assert_eq!(LangMessage::Stream(vec![0]).command_name(), None);
}
