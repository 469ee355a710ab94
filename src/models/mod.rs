pub mod client_model;
pub mod commande;
pub mod document;
pub mod line;

pub use client_model::{
    dedup_models, Client, ClientModel, ClientModelDraft, ClientModelFilter,
    ClientModelForm, ClientModelRow, CommandeVariants, Variant,
};
pub use commande::{Commande, NewCommande};
pub use document::{ExportDeclaration, LineDocument, Livraison, Resource};
pub use line::{ExportLine, LineField, LineItem, LivraisonLine};
