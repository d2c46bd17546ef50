use std::path::Path;

use os_energyplus::ForwardTranslator;

#[test]
fn demos_load_build_and_translate() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/projects");
    let demos = ["01_small_office.yaml"];

    for name in demos {
        let path = root.join(name);
        let project = os_project::load_yaml(&path)
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        let model = os_project::build_model(&project)
            .unwrap_or_else(|e| panic!("Failed to build {}: {}", name, e));
        let out = ForwardTranslator::new(project.options.clone()).translate_model(&model);
        assert_eq!(out.errors().count(), 0, "{name}: {:?}", out.diagnostics);
        assert!(!out.workspace.is_empty());
    }
}
