//! Hover, member listings, and inheritance navigation through the
//! service facade.

mod helpers;

use helpers::service_with_files;
use sdsl::Position;

#[test]
fn test_hover_on_base_reference() {
    let (_dir, service, paths) = service_with_files(&[
        ("Base.sdsl", "shader Base {}"),
        ("Derived.sdsl", "shader Derived : Base {}"),
    ]);

    // Cursor on "Base" in the base list of Derived.
    let hover = service.hover(&paths[1], Position::new(0, 18)).unwrap();
    assert!(hover.contents.contains("shader Base"));
    assert!(hover.contents.contains("Base.sdsl"));
}

#[test]
fn test_hover_on_variable_declaration() {
    let (_dir, service, paths) = service_with_files(&[(
        "S.sdsl",
        "shader S {\n    stage float4 Color;\n}",
    )]);

    let hover = service.hover(&paths[0], Position::new(1, 18)).unwrap();
    assert!(hover.contents.contains("stage float4 Color"));
}

#[test]
fn test_hover_header_summarizes_inheritance() {
    let (_dir, service, paths) = service_with_files(&[
        ("A.sdsl", "shader A {}"),
        ("B.sdsl", "shader B : A {}"),
        ("C.sdsl", "shader C : B {}"),
    ]);

    let hover = service.hover(&paths[2], Position::new(0, 8)).unwrap();
    assert!(hover.contents.contains("shader C : B"));
    assert!(hover.contents.contains("inherits 2 shader(s)"));
}

#[test]
fn test_members_grouped_by_definer_local_first() {
    let (_dir, service, paths) = service_with_files(&[
        (
            "Base.sdsl",
            "shader Base { stream float2 Uv; float4 Shade() { return 0; } }",
        ),
        ("Derived.sdsl", "shader Derived : Base { float Own; }"),
    ]);

    let groups = service.members(&paths[1]);
    assert_eq!(groups.len(), 2);

    assert_eq!(groups[0].definer, "Derived");
    assert!(groups[0].is_local);
    assert_eq!(groups[0].variables.len(), 1);

    assert_eq!(groups[1].definer, "Base");
    assert!(!groups[1].is_local);
    assert_eq!(groups[1].streams.len(), 1);
    assert_eq!(groups[1].methods.len(), 1);
    assert!(groups[1].variables.is_empty());
}

#[test]
fn test_inheritance_tree_structure() {
    let (_dir, service, paths) = service_with_files(&[
        ("Root.sdsl", "shader Root {}"),
        ("Left.sdsl", "shader Left : Root {}"),
        ("Right.sdsl", "shader Right : Root {}"),
        ("Top.sdsl", "shader Top : Left, Right {}"),
    ]);

    let tree = service.inheritance_tree(&paths[3]).unwrap();
    assert_eq!(tree.name, "Top");
    assert!(tree.is_local);
    assert_eq!(tree.children.len(), 2);
    assert_eq!(tree.children[0].name, "Left");
    assert_eq!(tree.children[0].children[0].name, "Root");
    assert_eq!(tree.children[1].name, "Right");
}

#[test]
fn test_inheritance_tree_with_cycle_is_finite() {
    let (_dir, service, paths) = service_with_files(&[
        ("A.sdsl", "shader A : B {}"),
        ("B.sdsl", "shader B : A {}"),
    ]);

    let tree = service.inheritance_tree(&paths[0]).unwrap();
    assert_eq!(tree.name, "A");
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].name, "B");
    // The recurrence back to A is cut off.
    assert!(tree.children[0].children.is_empty());
}

#[test]
fn test_inheritance_tree_missing_base_node() {
    let (_dir, service, paths) =
        service_with_files(&[("S.sdsl", "shader S : NotDiscovered {}")]);

    let tree = service.inheritance_tree(&paths[0]).unwrap();
    assert_eq!(tree.children.len(), 1);
    let child = &tree.children[0];
    assert_eq!(child.name, "NotDiscovered");
    assert!(child.file_path.is_none());
    assert!(!child.is_local);
}

#[test]
fn test_requests_on_unknown_path_return_empty() {
    let (_dir, service, _paths) = service_with_files(&[("S.sdsl", "shader S {}")]);

    let ghost = std::path::Path::new("/no/such/File.sdsl");
    assert!(service.hover(ghost, Position::new(0, 0)).is_none());
    assert!(service.members(ghost).is_empty());
    assert!(service.inheritance_tree(ghost).is_none());
    assert!(service.diagnostics(ghost).is_empty());
}
