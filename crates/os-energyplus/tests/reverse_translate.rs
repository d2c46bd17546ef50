use chrono::{Duration, NaiveDate};
use os_energyplus::{ForwardTranslator, ReverseTranslator};
use os_idf::parse_idf;
use os_model::{Model, ObjectType, Schedule, ThermalZone};
use os_schedule::TimeSeries;

#[test]
fn schedules_and_zones_survive_idf_text() {
    let mut m = Model::new();
    let zone = ThermalZone::new(&mut m);
    m.set_name(zone.id(), "Lobby");
    assert!(zone.set_multiplier(&mut m, 2));

    let start = NaiveDate::from_ymd_opt(2009, 3, 1)
        .unwrap()
        .and_hms_opt(0, 30, 0)
        .unwrap();
    let values = vec![4.0, 5.0, 6.0, 7.0];
    let series = TimeSeries::fixed(start, Duration::minutes(30), values).unwrap();
    let schedule = Schedule::from_time_series(&mut m, &series).unwrap();
    m.set_name(schedule.id(), "Half Hourly");

    let text = ForwardTranslator::default().translate_model(&m).to_idf(true);
    let ws = parse_idf(&text).unwrap();
    let out = ReverseTranslator::default().translate_workspace(&ws);
    assert_eq!(out.errors().count(), 0, "{:?}", out.diagnostics);
    let back = &out.model;

    let zones = back.objects_of_type(ObjectType::ThermalZone);
    assert_eq!(zones.len(), 1);
    assert_eq!(back.name(zones[0]), Some("Lobby"));
    assert_eq!(ThermalZone::from_id(back, zones[0]).unwrap().multiplier(back), Some(2));

    let schedules = back.objects_of_type(ObjectType::Schedule);
    assert_eq!(schedules.len(), 1);
    let decoded = Schedule::from_id(back, schedules[0])
        .and_then(|s| s.time_series(back))
        .unwrap();
    for (t, v) in series.date_times().iter().zip(series.values()) {
        assert_eq!(decoded.value_at(*t), Some(*v), "at {t}");
    }
}

#[test]
fn year_follows_the_translator() {
    let ws = parse_idf(
        "Schedule:Compact, Leap, , Through: 2/29, For: AllDays, Until: 24:00, 1, \
         Through: 12/31, For: AllDays, Until: 24:00, 0;",
    )
    .unwrap();

    // 2009 has no 29 February
    let out = ReverseTranslator::default().translate_workspace(&ws);
    assert_eq!(out.errors().count(), 1);

    let out = ReverseTranslator::new(2012).translate_workspace(&ws);
    assert_eq!(out.errors().count(), 0);
    assert_eq!(out.model.calendar_year(), 2012);
}
