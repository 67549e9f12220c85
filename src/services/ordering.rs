//! Ordenação do catálogo
//!
//! `ordem` crescente; itens sem `ordem` vão para o fim. Empate pelo nome,
//! sem diferenciar maiúsculas. A ordenação é feita em memória para não
//! depender de índice composto no Firestore.

use std::cmp::Ordering;

pub trait CatalogOrder {
    fn ordem(&self) -> Option<i64>;
    fn label(&self) -> &str;
}

pub fn compare<T: CatalogOrder>(a: &T, b: &T) -> Ordering {
    let by_ordem = match (a.ordem(), b.ordem()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_ordem.then_with(|| a.label().to_lowercase().cmp(&b.label().to_lowercase()))
}

pub fn sort_catalog<T: CatalogOrder>(items: &mut [T]) {
    items.sort_by(compare);
}

impl CatalogOrder for crate::models::Kit {
    fn ordem(&self) -> Option<i64> {
        self.ordem
    }
    fn label(&self) -> &str {
        &self.nome
    }
}

impl CatalogOrder for crate::models::Produto {
    fn ordem(&self) -> Option<i64> {
        self.ordem
    }
    fn label(&self) -> &str {
        &self.nome
    }
}

impl CatalogOrder for crate::models::GaleriaItem {
    fn ordem(&self) -> Option<i64> {
        Some(self.ordem)
    }
    fn label(&self) -> &str {
        &self.titulo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item(Option<i64>, &'static str);

    impl CatalogOrder for Item {
        fn ordem(&self) -> Option<i64> {
            self.0
        }
        fn label(&self) -> &str {
            self.1
        }
    }

    #[test]
    fn test_absent_ordem_sorts_last_and_ties_by_name() {
        let mut items = vec![
            Item(None, "Zebra"),
            Item(Some(2), "b"),
            Item(None, "abelha"),
            Item(Some(1), "c"),
            Item(Some(2), "A"),
        ];

        sort_catalog(&mut items);

        let order: Vec<&str> = items.iter().map(|i| i.1).collect();
        assert_eq!(order, vec!["c", "A", "b", "abelha", "Zebra"]);
    }
}
