//! Port classification, overrides and binding.

mod common;

use common::{MockPlugin, PortSpec};
use porthost_core::{
    BindingMap, ClassifyFault, Direction, HostError, ParamOverride, Plugin, PortClass,
    PortRegion, PortTable, SignalKind, UnsupportedPortPolicy,
};
use proptest::prelude::*;

fn mixed_plugin() -> MockPlugin {
    MockPlugin::new(
        "urn:test:mixed",
        vec![
            PortSpec::control_in("gain", 0.5),
            PortSpec::audio_in("in_l"),
            PortSpec::audio_out("out_l"),
            PortSpec::audio_in("in_r"),
            PortSpec::audio_out("out_r"),
            PortSpec::new("events", &[PortClass::Input, PortClass::Atom]).optional(),
            PortSpec::control_out("level"),
        ],
    )
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[test]
fn classifies_every_port_in_index_order() {
    let plugin = mixed_plugin();
    let table = PortTable::classify(&plugin, UnsupportedPortPolicy::Skip).unwrap();

    assert_eq!(table.len(), 7);
    for (i, port) in table.ports().iter().enumerate() {
        assert_eq!(port.index, i as u32);
    }
    assert_eq!(table.n_audio_in(), 2);
    assert_eq!(table.n_audio_out(), 2);

    let events = table.by_symbol("events").unwrap();
    assert_eq!(events.kind, SignalKind::Unsupported);
    assert!(events.optional);

    let level = table.by_symbol("level").unwrap();
    assert_eq!(level.kind, SignalKind::Control);
    assert_eq!(level.direction, Some(Direction::Output));
}

#[test]
fn nan_default_falls_back_to_zero() {
    let plugin = MockPlugin::new(
        "urn:test:defaults",
        vec![
            PortSpec::control_in("a", 0.5),
            PortSpec::control_in("b", f32::NAN),
            PortSpec::audio_out("out"),
        ],
    );
    let table = PortTable::classify(&plugin, UnsupportedPortPolicy::Skip).unwrap();
    assert_eq!(table.get(0).unwrap().value, 0.5);
    assert_eq!(table.get(1).unwrap().value, 0.0);
}

#[test]
fn directionless_port_is_fatal_unless_optional() {
    let plugin = MockPlugin::new(
        "urn:test:broken",
        vec![
            PortSpec::audio_out("out"),
            PortSpec::new("mystery", &[PortClass::Audio]),
        ],
    );
    let err = PortTable::classify(&plugin, UnsupportedPortPolicy::Skip).unwrap_err();
    assert!(matches!(
        err,
        HostError::PortClassification {
            index: 1,
            fault: ClassifyFault::NoDirection
        }
    ));

    let plugin = MockPlugin::new(
        "urn:test:lenient",
        vec![
            PortSpec::audio_out("out"),
            PortSpec::new("sidechain", &[PortClass::Audio]).optional(),
        ],
    );
    let table = PortTable::classify(&plugin, UnsupportedPortPolicy::Skip).unwrap();
    let sidechain = table.get(1).unwrap();
    assert_eq!(sidechain.direction, None);
    assert_eq!(sidechain.kind, SignalKind::Audio);
    // Unresolved audio ports take no channel.
    assert_eq!(table.n_audio_in() + table.n_audio_out(), 1);
}

#[test]
fn reject_policy_fails_required_unsupported_ports() {
    let plugin = MockPlugin::new(
        "urn:test:cv",
        vec![
            PortSpec::new("cv", &[PortClass::Input, PortClass::Cv]),
            PortSpec::audio_out("out"),
        ],
    );
    assert!(PortTable::classify(&plugin, UnsupportedPortPolicy::Skip).is_ok());

    let err = PortTable::classify(&plugin, UnsupportedPortPolicy::Reject).unwrap_err();
    assert!(matches!(
        err,
        HostError::PortClassification {
            index: 0,
            fault: ClassifyFault::UnsupportedKind
        }
    ));
}

#[test]
fn reject_policy_still_skips_optional_unsupported_ports() {
    let plugin = mixed_plugin();
    let table = PortTable::classify(&plugin, UnsupportedPortPolicy::Reject).unwrap();
    assert_eq!(table.by_symbol("events").unwrap().kind, SignalKind::Unsupported);
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

#[test]
fn known_override_changes_exactly_one_value() {
    let plugin = mixed_plugin();
    let mut table = PortTable::classify(&plugin, UnsupportedPortPolicy::Skip).unwrap();
    let before = table.clone();

    table
        .apply_overrides(&plugin, &[ParamOverride::new("gain", 0.9)])
        .unwrap();

    let changed: Vec<u32> = table
        .ports()
        .iter()
        .zip(before.ports())
        .filter(|(a, b)| a.value != b.value)
        .map(|(a, _)| a.index)
        .collect();
    assert_eq!(changed, vec![0]);
    assert_eq!(table.get(0).unwrap().value, 0.9);
}

#[test]
fn unknown_override_stops_further_overrides() {
    let plugin = mixed_plugin();
    let mut table = PortTable::classify(&plugin, UnsupportedPortPolicy::Skip).unwrap();

    let overrides = [
        ParamOverride::new("gain", 0.25),
        ParamOverride::new("nonexistent", 1.0),
        ParamOverride::new("level", 7.0),
    ];
    let err = table.apply_overrides(&plugin, &overrides).unwrap_err();

    assert!(matches!(err, HostError::UnknownOverrideSymbol { ref symbol } if symbol == "nonexistent"));
    assert_eq!(table.by_symbol("gain").unwrap().value, 0.25);
    assert_eq!(table.by_symbol("level").unwrap().value, 0.0);
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

#[test]
fn binding_assigns_channels_in_ascending_port_order() {
    let plugin = mixed_plugin();
    let table = PortTable::classify(&plugin, UnsupportedPortPolicy::Skip).unwrap();
    let map = BindingMap::plan(&table);

    let regions: Vec<PortRegion> = map.bindings().iter().map(|b| b.region).collect();
    assert_eq!(
        regions,
        vec![
            PortRegion::Control(0),
            PortRegion::AudioIn(0),
            PortRegion::AudioOut(0),
            PortRegion::AudioIn(1),
            PortRegion::AudioOut(1),
            PortRegion::Unbound,
            PortRegion::Control(6),
        ]
    );
    assert_eq!(map.output_port(1), Some(4));
}

#[test]
fn binding_connects_every_port_once_and_is_repeatable() {
    let plugin = mixed_plugin();
    let table = PortTable::classify(&plugin, UnsupportedPortPolicy::Skip).unwrap();

    let mut first = plugin.instantiate(44_100.0).unwrap();
    let map_a = BindingMap::bind(&table, first.as_mut());
    let mut second = plugin.instantiate(44_100.0).unwrap();
    let map_b = BindingMap::bind(&table, second.as_mut());

    assert_eq!(map_a, map_b);
    let log = plugin.log.borrow();
    let indices: Vec<u32> = log.connections.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5, 6, 0, 1, 2, 3, 4, 5, 6]);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn port_strategy() -> impl Strategy<Value = PortSpec> {
    prop_oneof![
        Just(PortSpec::control_in("c", 1.0)),
        Just(PortSpec::control_out("k")),
        Just(PortSpec::audio_in("i")),
        Just(PortSpec::audio_out("o")),
        Just(PortSpec::new("a", &[PortClass::Input, PortClass::Atom])),
        Just(PortSpec::new("x", &[PortClass::Atom]).optional()),
        Just(PortSpec::new("s", &[PortClass::Audio]).optional()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every port gets a descriptor; non-optional ones a direction; audio
    /// counts match the audio descriptors with a direction.
    #[test]
    fn table_covers_every_port(ports in prop::collection::vec(port_strategy(), 0..24)) {
        let plugin = MockPlugin::new("urn:test:prop", ports.clone());
        let table = PortTable::classify(&plugin, UnsupportedPortPolicy::Skip).unwrap();

        prop_assert_eq!(table.len(), ports.len());
        for port in table.ports() {
            prop_assert!(port.optional || port.direction.is_some());
        }
        let audio = table
            .ports()
            .iter()
            .filter(|p| p.kind == SignalKind::Audio && p.direction.is_some())
            .count();
        prop_assert_eq!(table.n_audio_in() + table.n_audio_out(), audio);

        let map = BindingMap::plan(&table);
        prop_assert_eq!(map.bindings().len(), ports.len());
        prop_assert_eq!(map, BindingMap::plan(&table));
    }
}
