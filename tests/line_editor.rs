use bigdecimal::BigDecimal;
use commande_admin_rust::editor::{
    bind_model, compute_line_amount, compute_total, display_amount, remove_line, update_field,
};
use commande_admin_rust::models::{
    ClientModel, ExportDeclaration, LineField, Livraison, LivraisonLine,
};
use commande_admin_rust::{DocumentBinder, EditState, LineEditor, LineKey};
use std::str::FromStr;
use std::time::Duration;

fn catalog() -> Vec<ClientModel> {
    serde_json::from_str(
        r#"[
            {"id":"m1","name":"Polo","description":"Polo piqué","commandes":"OPR3328",
             "lotto":null,"ordine":null,"puht":null,"clientId":"c1","client":null,"createdAt":null},
            {"id":"m2","name":null,"description":"sans nom","commandes":"OPR0001",
             "lotto":null,"ordine":null,"puht":"12.5","clientId":"c1","client":null,"createdAt":null}
        ]"#,
    )
    .unwrap()
}

fn filled_declaration(editor: &LineEditor) -> ExportDeclaration {
    let mut decl = ExportDeclaration::new("a@b.c", "ACME");
    for _ in 0..3 {
        decl = editor.add_line(&decl);
    }
    let decl = update_field(&decl, LineKey::At(0), LineField::Quantity, "3");
    let decl = update_field(&decl, LineKey::At(0), LineField::UnitPrice, "2.5");
    let decl = update_field(&decl, LineKey::At(1), LineField::Quantity, "2");
    let decl = update_field(&decl, LineKey::At(1), LineField::UnitPrice, "40");
    update_field(&decl, LineKey::At(2), LineField::UnitPrice, "1.10")
}

#[test]
fn field_updates_preserve_count_and_order() {
    let editor = LineEditor::new();
    let decl = filled_declaration(&editor);
    let ids: Vec<String> = decl.lines.iter().map(|l| l.id.clone()).collect();

    let edits = [
        (LineField::Commande, "OPR9"),
        (LineField::Modele, "Polo"),
        (LineField::Description, "texte"),
        (LineField::Quantity, "abc"),
        (LineField::UnitPrice, ""),
        (LineField::Excluded, "on"),
    ];
    let mut current = decl.clone();
    for (field, raw) in edits {
        let next = update_field(&current, LineKey::At(1), field, raw);
        assert_eq!(next.lines.len(), current.lines.len());
        assert_eq!(next.lines[0], current.lines[0]);
        assert_eq!(next.lines[2], current.lines[2]);
        current = next;
    }
    let after: Vec<String> = current.lines.iter().map(|l| l.id.clone()).collect();
    assert_eq!(after, ids);
    assert_eq!(current.lines[1].quantity, 0);
}

#[test]
fn total_ignores_excluded_lines() {
    let editor = LineEditor::new();
    let decl = filled_declaration(&editor);
    // 7.50 + 80.00 + 1.10
    assert_eq!(display_amount(&compute_total(&decl)), "88.60");

    let decl = update_field(&decl, LineKey::At(1), LineField::Excluded, "true");
    assert_eq!(display_amount(&compute_total(&decl)), "8.60");
    assert_eq!(decl.lines.len(), 3);
    assert_eq!(
        compute_line_amount(&decl.lines[1]),
        BigDecimal::from_str("80").unwrap()
    );
}

#[test]
fn bind_model_keeps_quantity_and_price() {
    let editor = LineEditor::new();
    let decl = filled_declaration(&editor);
    let decl = update_field(&decl, LineKey::At(0), LineField::Description, "saisie");
    let id = decl.lines[0].id.clone();

    let bound = bind_model(&decl, id.as_str(), "Polo", &catalog());
    assert_eq!(bound.lines[0].commande, "OPR3328");
    assert_eq!(bound.lines[0].description, "Polo piqué");
    assert_eq!(bound.lines[0].quantity, 3);
    assert_eq!(display_amount(&bound.lines[0].unit_price), "2.50");

    // 无名模型不会被选中
    let missed = bind_model(&bound, LineKey::At(0), "", &catalog());
    assert_eq!(missed.lines[0].commande, "");
    assert_eq!(missed.lines[0].description, "");
}

#[test]
fn remove_shifts_positions_of_following_lines() {
    let editor = LineEditor::new();
    let decl = filled_declaration(&editor);
    let third = decl.lines[2].id.clone();

    let decl = remove_line(&decl, LineKey::At(0));
    assert_eq!(decl.lines[1].id, third);

    let decl = update_field(&decl, third.as_str(), LineField::Commande, "ID-ADDRESSED");
    assert_eq!(decl.lines[1].commande, "ID-ADDRESSED");
}

#[test]
fn livraison_lines_share_the_editor() {
    let editor = LineEditor::new();
    let liv = editor.add_line(&Livraison::new("a@b.c", "ACME"));
    let liv = update_field(&liv, LineKey::At(0), LineField::Modele, "Polo");
    let liv = update_field(&liv, LineKey::At(0), LineField::Quantity, "");

    let expected = LivraisonLine {
        id: liv.lines[0].id.clone(),
        modele: "Polo".to_string(),
        commande: String::new(),
        description: String::new(),
        quantity: 0,
        livraison_id: String::new(),
    };
    assert_eq!(liv.lines, vec![expected]);
}

#[test]
fn binder_holds_whole_document_edits() {
    let editor = LineEditor::new();
    let mut binder: DocumentBinder<ExportDeclaration> = DocumentBinder::new(Duration::from_secs(30));
    binder.load(ExportDeclaration::new("a@b.c", "ACME")).unwrap();

    binder.edit(|d| editor.add_line(d)).unwrap();
    binder
        .edit(|d| update_field(d, LineKey::At(0), LineField::UnitPrice, "9.99"))
        .unwrap();

    assert_eq!(binder.state(), &EditState::Dirty);
    let doc = binder.document().unwrap();
    assert_eq!(doc.lines.len(), 1);
    assert_eq!(display_amount(&compute_total(doc)), "9.99");
}
