use itertools::Itertools;
use pf_rs::model::drive_node::DriveNode;
use pf_rs::model::project::Inclusion;
use pf_rs::model::tree_like::{find_shared_roots, is_visible, locate, TreeLike};
use pf_rs::PfErrKind;
use rand::Rng;
use test_utils::assert::{disjoint, ids_equal_ignore_order};
use test_utils::*;

#[test]
fn find_every_present_id() {
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        let tree = random_tree(&mut rng, 3);
        for id in tree.ids() {
            assert_eq!(locate(&tree, id).unwrap().id, id);
            assert_eq!(tree.find(id).unwrap().id, id);
        }
    }
}

#[test]
fn find_absent_id() {
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        let tree = random_tree(&mut rng, 3);
        let absent = random_name();
        assert!(locate(&tree, &absent).is_none());
        assert_matches!(
            tree.find(&absent).unwrap_err().kind,
            PfErrKind::FolderNonexistent
        );
    }
}

#[test]
fn shared_roots_are_included_and_disjoint() {
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        let tree = random_tree(&mut rng, 4);
        let included = tree
            .ids()
            .into_iter()
            .filter(|_| rng.gen_bool(0.3))
            .collect_vec();
        let inclusion = Inclusion::explicit(included.iter().copied());

        let roots = find_shared_roots(&tree, &inclusion);

        for root in &roots {
            assert!(inclusion.includes(&root.id));
        }
        disjoint(&roots);
        // every included folder is reachable from some shared root
        for id in &included {
            assert!(roots.iter().any(|root| root.contains(id)));
            assert!(is_visible(&tree, id, &inclusion));
        }
    }
}

#[test]
fn empty_inclusion_shares_nothing() {
    let tree = wedding_tree();
    assert!(find_shared_roots(&tree, &Inclusion::explicit(Vec::<String>::new())).is_empty());
    assert!(!is_visible(&tree, "ceremony", &Inclusion::explicit(Vec::<String>::new())));
}

#[test]
fn unrestricted_shares_whole_tree() {
    let tree = wedding_tree();
    let roots = find_shared_roots(&tree, &Inclusion::Unrestricted);
    assert_eq!(roots.iter().map(|root| root.id.as_str()).collect_vec(), vec!["wedding"]);
}

#[test]
fn sibling_included_alone() {
    let tree = DriveNode::new("root", "root")
        .with_folder(DriveNode::new("f1", "x"))
        .with_folder(DriveNode::new("f2", "y"));

    let roots = find_shared_roots(&tree, &Inclusion::explicit(["f2"]));

    assert_eq!(roots.iter().map(|root| root.id.as_str()).collect_vec(), vec!["f2"]);
}

#[test]
fn nested_inclusion_collapses_to_ancestor() {
    let tree = wedding_tree();
    let roots = find_shared_roots(&tree, &Inclusion::explicit(["dances", "reception", "ceremony"]));
    ids_equal_ignore_order(
        &roots.iter().map(|root| root.id.as_str()).collect_vec(),
        &["ceremony", "reception"],
    );
}

#[test]
fn all_images_know_their_folders() {
    let tree = wedding_tree();
    let images = tree.all_images();
    let dance = images.iter().find(|image| image.id == "d1").unwrap();
    assert_eq!(dance.folder_path_list, vec!["Wedding", "Reception", "Dances"]);
    assert_eq!(images.len(), 4);
}

#[test]
fn trees_survive_the_wire() {
    let mut rng = rand::thread_rng();
    let tree = random_tree(&mut rng, 3);
    let decoded = DriveNode::from_json(&tree.to_json().unwrap()).unwrap();
    assert_eq!(decoded, tree);
}
