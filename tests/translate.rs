use std::{cell::RefCell, collections::BTreeMap};

use map_macro::btree_map;
use usd_arnold::prelude::*;

const SCENE: &str = r#"
def Scope "Looks" {
    def Material "metal" {
        rel ai:surface = </Looks/metal/std>
        rel ai:displacement = </Looks/metal/bump>

        def Shader "std" {
            rel connectedSourceFor:kd_Color:r = </Looks/metal/tex.outputs:out>
            rel connectedSourceFor:kd_Color:g = [
                </Looks/metal/tex.outputs:g>,
                </Looks/metal/noise.outputs:g>,
            ]
            rel connectedSourceFor:specular = </Looks/metal/noise.outputs:out>
            inputs:roughness.connect = </Looks/metal/noise.outputs:out>
            inputs:weights:i0.connect = </Looks/metal/noise.outputs:out>
            inputs:normal.connect = </Looks/metal/gone.outputs:out>
        }

        def Shader "bump" {
            inputs:height:x.connect = </Looks/metal/noise.outputs:r>
        }

        def Shader "tex" {
            string handle = "metal_tex"
            inputs:uv.connect = </Looks/shared/coords.outputs:out>
        }

        def Shader "noise" {
        }
    }

    def Material "plastic" {
        rel ai:surface = </Looks/plastic/std2>

        def Shader "std2" {
            inputs:base_color.connect = </Looks/shared/coords.outputs:out>
        }
    }

    def Scope "shared" {
        def Shader "coords" {
            inputs:scale:i1.connect = </Looks/shared/coords.outputs:out>
        }
    }
}
"#;

fn path(s: &str) -> Path {
    s.parse().unwrap()
}

/// Tree holding the node groups of every shader of `scene`.
fn materialized(scene: &Scene, config: &TranslatorConfig) -> AttributeTree {
    let mut tree = AttributeTree::default();
    for prim in scene.prims_of_type("Shader") {
        let handle = PrimNameHandles.handle(prim);
        tree.set_attr(&format!("{}.type", config.node_location(&handle)), "shader".into());
    }
    tree
}

fn connections(
    tree: &AttributeTree,
    config: &TranslatorConfig,
    handle: &str,
) -> BTreeMap<String, String> {
    tree.output_attr(&config.connections_location(handle))
        .and_then(Attribute::as_group)
        .map(|group| {
            group
                .flatten()
                .into_iter()
                .map(|(k, v)| (k, v.as_str().unwrap_or_default().to_owned()))
                .collect()
        })
        .unwrap_or_default()
}

fn owned(map: BTreeMap<&str, &str>) -> BTreeMap<String, String> {
    map.into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect()
}

#[test]
fn translate_material_from_text() {
    let scene = Scene::from_usda(SCENE).unwrap();
    let config = TranslatorConfig::default();
    let mut tree = materialized(&scene, &config);

    let skips = RefCell::new(Vec::new());
    let summary = Translator::new(&scene, &PrimNameHandles)
        .on_skip(|skip| skips.borrow_mut().push(skip.clone()))
        .read_prim_location(&path("/Looks/metal"), &mut tree);

    assert_eq!(
        connections(&tree, &config, "std"),
        owned(btree_map! {
            "kd_Color.r" => "out@metal_tex",
            "roughness" => "out@noise",
        })
    );
    assert_eq!(
        connections(&tree, &config, "bump"),
        owned(btree_map! { "height.x" => "out.r@noise" })
    );
    assert_eq!(
        connections(&tree, &config, "metal_tex"),
        owned(btree_map! { "uv" => "out@coords" })
    );
    // Array connections are left to the host.
    assert!(connections(&tree, &config, "coords").is_empty());
    assert!(connections(&tree, &config, "noise").is_empty());

    assert_eq!(
        skips.into_inner(),
        vec![
            // Reached through `std` -> `tex` before `std` looks at its other relationships.
            Skip {
                node: path("/Looks/shared/coords"),
                reason: SkipReason::ArrayTarget,
            },
            Skip {
                node: path("/Looks/metal/std"),
                reason: SkipReason::AmbiguousRelationship(2),
            },
            Skip {
                node: path("/Looks/metal/std"),
                reason: SkipReason::NotSubParameter,
            },
            Skip {
                node: path("/Looks/metal/std"),
                reason: SkipReason::ArrayTarget,
            },
            Skip {
                node: path("/Looks/metal/std"),
                reason: SkipReason::MissingUpstream(path("/Looks/metal/gone.outputs:out")),
            },
        ]
    );

    assert_eq!(
        summary,
        Summary {
            visited: 5,
            committed: 3,
            edges: 4,
            skipped: 5,
        }
    );
}

#[test]
fn each_material_gets_a_fresh_visited_set() {
    let scene = Scene::from_usda(SCENE).unwrap();
    let config = TranslatorConfig::default();
    let mut tree = materialized(&scene, &config);

    let mut translator = Translator::new(&scene, &PrimNameHandles);
    let metal = translator.read_prim_location(&path("/Looks/metal"), &mut tree);
    let plastic = translator.read_prim_location(&path("/Looks/plastic"), &mut tree);

    // `coords` was already visited by the first material and is visited again by the second.
    assert_eq!(metal.visited, 5);
    assert_eq!(plastic.visited, 2);
    assert_eq!(
        connections(&tree, &config, "std2"),
        owned(btree_map! { "base_color" => "out@coords" })
    );
}

#[test]
fn translation_is_idempotent() {
    let scene = Scene::from_usda(SCENE).unwrap();
    let config = TranslatorConfig::default();
    let mut tree = materialized(&scene, &config);

    let mut translator = Translator::new(&scene, &PrimNameHandles);
    let first = translator.read_prim_location(&path("/Looks/metal"), &mut tree);
    let once = tree.clone();
    let second = translator.read_prim_location(&path("/Looks/metal"), &mut tree);

    assert_eq!(tree, once);
    assert_eq!(first, second);
}

#[test]
fn only_materials_are_read() {
    let scene = Scene::from_usda(SCENE).unwrap();
    let config = TranslatorConfig::default();
    let mut tree = materialized(&scene, &config);
    let before = tree.clone();

    let mut translator = Translator::new(&scene, &PrimNameHandles);
    for location in ["/Looks", "/Looks/metal/std", "/Looks/missing"] {
        let summary = translator.read_prim_location(&path(location), &mut tree);
        assert_eq!(summary, Summary::default(), "{location}");
    }

    assert_eq!(tree, before);
}

#[test]
fn custom_locations() {
    let scene = Scene::from_usda(SCENE).unwrap();
    let config = TranslatorConfig {
        nodes_location: "arnold.nodes".to_owned(),
        connections_key: "links".to_owned(),
        ..Default::default()
    };
    let mut tree = materialized(&scene, &config);

    Translator::new(&scene, &PrimNameHandles)
        .with_config(&config)
        .read_prim_location(&path("/Looks/plastic"), &mut tree);

    assert_eq!(
        tree.output_attr("arnold.nodes.std2.links.base_color")
            .and_then(Attribute::as_str),
        Some("out@coords")
    );
    assert!(tree.output_attr("material").is_none());
}

#[test]
fn materials_translate_on_separate_threads() {
    let scene = Scene::from_usda(SCENE).unwrap();
    let config = TranslatorConfig::default();
    let materials = ["/Looks/metal", "/Looks/plastic"];

    let translate = |location: &str| {
        let mut tree = materialized(&scene, &config);
        let summary = Translator::new(&scene, &PrimNameHandles)
            .read_prim_location(&path(location), &mut tree);
        (summary, tree)
    };

    let sequential: Vec<_> = materials.into_iter().map(translate).collect();

    let threaded: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = materials
            .into_iter()
            .map(|location| scope.spawn(move || translate(location)))
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(threaded, sequential);
    assert_eq!(threaded[0].0.committed, 3);
    assert_eq!(threaded[1].0.committed, 1);
}
