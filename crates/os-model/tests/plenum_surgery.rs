//! Integration tests for plenum splicing on air loop demand sides.

use os_model::{
    AirLoopHVAC, AirTerminal, AirTerminalKind, Mixer, Model, Node, ObjectType, Splitter,
    SupplyPlenum, ThermalZone, ZoneHVACEquipment,
};

/// Air loop with `n` conditioned zones, no terminals.
fn loop_with_zones(n: usize) -> (Model, AirLoopHVAC, Vec<ThermalZone>) {
    let mut m = Model::new();
    let air = AirLoopHVAC::new(&mut m);
    let zones: Vec<_> = (0..n).map(|_| ThermalZone::new(&mut m)).collect();
    for z in &zones {
        assert!(air.add_branch_for_zone(&mut m, *z, None));
    }
    (m, air, zones)
}

#[test]
fn shared_plenums_grow_demand_side() {
    let (mut m, air, zones) = loop_with_zones(2);
    assert_eq!(air.demand_components(&m).len(), 10);

    let supply_zone = ThermalZone::new(&mut m);
    let return_zone = ThermalZone::new(&mut m);

    assert!(zones[0].set_supply_plenum(&mut m, supply_zone));
    assert!(zones[0].set_return_plenum(&mut m, return_zone));
    assert!(zones[1].set_supply_plenum(&mut m, supply_zone));
    assert!(zones[1].set_return_plenum(&mut m, return_zone));

    // one inlet node and one outlet node for the whole pair
    assert_eq!(air.demand_components(&m).len(), 14);
    assert_eq!(air.supply_plenums(&m).len(), 1);
    assert_eq!(air.return_plenums(&m).len(), 1);

    let sp = zones[0].supply_plenum(&m).unwrap();
    assert_eq!(zones[1].supply_plenum(&m), Some(sp));
    assert_eq!(sp.thermal_zone(&m), Some(supply_zone));
    assert_eq!(sp.outlet_objects(&m).len(), 2);
    let rp = zones[0].return_plenum(&m).unwrap();
    assert_eq!(rp.inlet_objects(&m).len(), 2);

    // the zone splitter and mixer now see a single branch each
    assert_eq!(air.zone_splitter(&m).unwrap().outlet_objects(&m).len(), 1);
    assert_eq!(air.zone_mixer(&m).unwrap().inlet_objects(&m).len(), 1);

    let third = ThermalZone::new(&mut m);
    assert!(air.add_branch_for_zone(&mut m, third, None));
    assert_eq!(air.demand_components(&m).len(), 17);
    assert_eq!(third.supply_plenum(&m), None);
    assert_eq!(third.air_loop_hvac(&m), Some(air));

    // joining the existing pair adds no objects
    assert!(third.set_supply_plenum(&mut m, supply_zone));
    assert!(third.set_return_plenum(&mut m, return_zone));
    assert_eq!(air.demand_components(&m).len(), 17);
    assert_eq!(air.supply_plenums(&m), vec![sp]);
    assert_eq!(air.return_plenums(&m), vec![rp]);
    assert_eq!(sp.outlet_objects(&m).len(), 3);
    assert_eq!(rp.inlet_objects(&m).len(), 3);
    assert_eq!(air.zone_splitter(&m).unwrap().outlet_objects(&m).len(), 1);
    assert_eq!(air.zone_mixer(&m).unwrap().inlet_objects(&m).len(), 1);
}

#[test]
fn second_zone_branch_belongs_to_the_loop() {
    let (m, air, zones) = loop_with_zones(3);
    // inlet, splitter, 3 x (node, zone, node), mixer, outlet
    let demand = air.demand_components(&m);
    assert_eq!(demand.len(), 13);
    assert_eq!(air.thermal_zones(&m), zones);
    for z in &zones {
        assert_eq!(z.air_loop_hvac(&m), Some(air));
    }
    let mixer = air.zone_mixer(&m).unwrap().id();
    let position = |id| demand.iter().position(|o| *o == id).unwrap();
    assert!(zones.iter().all(|z| position(z.id()) < position(mixer)));
}

#[test]
fn refused_plenum_change_keeps_the_old_plenum() {
    let (mut m, air, zones) = loop_with_zones(1);
    let first = ThermalZone::new(&mut m);
    assert!(zones[0].set_supply_plenum(&mut m, first));
    let old = zones[0].supply_plenum(&m).unwrap();
    let before = air.demand_components(&m);

    // a plenum off every loop but already wired cannot take the branch
    let second = ThermalZone::new(&mut m);
    let stray_plenum = SupplyPlenum::new(&mut m);
    assert!(stray_plenum.set_thermal_zone(&mut m, second));
    let stray = Node::new(&mut m);
    m.connect(stray.id(), 0, stray_plenum.id(), 0);

    assert!(!zones[0].set_supply_plenum(&mut m, second));
    assert_eq!(zones[0].supply_plenum(&m), Some(old));
    assert_eq!(old.thermal_zone(&m), Some(first));
    assert_eq!(air.demand_components(&m), before);
}

#[test]
fn removing_plenums_restores_branches() {
    let (mut m, air, zones) = loop_with_zones(2);
    let supply_zone = ThermalZone::new(&mut m);
    let return_zone = ThermalZone::new(&mut m);
    for z in &zones {
        assert!(z.set_supply_plenum(&mut m, supply_zone));
        assert!(z.set_return_plenum(&mut m, return_zone));
    }

    // first branch leaves, the plenum stays for the second
    assert!(zones[0].remove_supply_plenum(&mut m));
    assert!(zones[0].remove_return_plenum(&mut m));
    assert_eq!(air.supply_plenums(&m).len(), 1);
    assert_eq!(air.demand_components(&m).len(), 14);
    assert_eq!(air.zone_splitter(&m).unwrap().outlet_objects(&m).len(), 2);

    // last branch takes the plenum, its inlet node and outlet node with it
    assert!(zones[1].remove_supply_plenum(&mut m));
    assert!(zones[1].remove_return_plenum(&mut m));
    assert!(air.supply_plenums(&m).is_empty());
    assert!(air.return_plenums(&m).is_empty());
    assert_eq!(air.demand_components(&m).len(), 10);
    assert!(m.objects_of_type(ObjectType::SupplyPlenum).is_empty());

    // plenum zones are free again
    assert!(!supply_zone.is_plenum(&m));
    assert!(supply_zone.can_be_plenum(&m));
}

#[test]
fn removing_a_zone_branch_takes_its_plenum_branch() {
    let (mut m, air, zones) = loop_with_zones(2);
    let supply_zone = ThermalZone::new(&mut m);
    for z in &zones {
        assert!(z.set_supply_plenum(&mut m, supply_zone));
    }
    assert_eq!(air.demand_components(&m).len(), 12);

    assert!(air.remove_branch_for_zone(&mut m, zones[0]));
    assert_eq!(air.demand_components(&m).len(), 9);
    assert_eq!(zones[1].supply_plenum(&m).map(|p| p.outlet_objects(&m).len()), Some(1));

    assert!(air.remove_branch_for_zone(&mut m, zones[1]));
    assert_eq!(air.demand_components(&m).len(), 5);
    assert!(air.supply_plenums(&m).is_empty());
}

#[test]
fn one_zone_backs_one_plenum() {
    let (mut m, _air, zones) = loop_with_zones(2);
    let plenum_zone = ThermalZone::new(&mut m);

    assert!(zones[0].set_supply_plenum(&mut m, plenum_zone));
    assert!(plenum_zone.is_plenum(&m));
    assert!(!zones[1].set_return_plenum(&mut m, plenum_zone));
    assert_eq!(zones[1].return_plenum(&m), None);

    // plenum zones refuse ideal loads and equipment
    assert!(!plenum_zone.set_use_ideal_air_loads(&mut m, true));
    let baseboard = ZoneHVACEquipment::new(&mut m);
    assert!(!baseboard.add_to_thermal_zone(&mut m, plenum_zone));
}

#[test]
fn unfit_plenum_zones_are_refused() {
    let (mut m, air, zones) = loop_with_zones(2);

    // conditioned by the loop itself
    assert!(!zones[0].set_supply_plenum(&mut m, zones[1]));
    assert!(!zones[0].set_supply_plenum(&mut m, zones[0]));

    let with_equipment = ThermalZone::new(&mut m);
    let baseboard = ZoneHVACEquipment::new(&mut m);
    assert!(baseboard.add_to_thermal_zone(&mut m, with_equipment));
    assert!(!zones[0].set_return_plenum(&mut m, with_equipment));

    let ideal = ThermalZone::new(&mut m);
    assert!(ideal.set_use_ideal_air_loads(&mut m, true));
    assert!(!zones[0].set_supply_plenum(&mut m, ideal));

    assert_eq!(air.demand_components(&m).len(), 10);
    assert!(m.objects_of_type(ObjectType::SupplyPlenum).is_empty());
    assert!(m.objects_of_type(ObjectType::ReturnPlenum).is_empty());
}

#[test]
fn plenum_zone_cannot_join_a_loop() {
    let (mut m, air, zones) = loop_with_zones(1);
    let plenum_zone = ThermalZone::new(&mut m);
    assert!(zones[0].set_return_plenum(&mut m, plenum_zone));
    assert!(!air.add_branch_for_zone(&mut m, plenum_zone, None));
}

#[test]
fn direct_air_branch_behind_supply_plenum() {
    let mut m = Model::new();
    let air = AirLoopHVAC::new(&mut m);
    let zone = ThermalZone::new(&mut m);
    let terminal = AirTerminal::new(&mut m, AirTerminalKind::Uncontrolled);
    assert!(air.add_branch_for_zone(&mut m, zone, Some(terminal)));

    let plenum_zone = ThermalZone::new(&mut m);
    assert!(zone.set_supply_plenum(&mut m, plenum_zone));
    let plenum = zone.supply_plenum(&m).unwrap();
    assert_eq!(plenum.outlet_objects(&m), vec![terminal.id()]);

    assert!(zone.remove_supply_plenum(&mut m));
    let splitter = air.zone_splitter(&m).unwrap();
    assert_eq!(splitter.outlet_objects(&m), vec![terminal.id()]);
}
