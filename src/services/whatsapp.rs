//! Links de orçamento pelo WhatsApp (`https://wa.me/{numero}?text=...`)

use crate::config::CatalogSettings;

/// Dados do item citado na mensagem
#[derive(Debug, Clone, Default)]
pub struct QuoteItem<'a> {
    pub nome: &'a str,
    pub codigo: Option<&'a str>,
    pub link: &'a str,
    pub foto_url: Option<&'a str>,
}

pub fn quote_message(site_name: &str, item: &QuoteItem) -> String {
    let codigo = item.codigo.map(str::trim).unwrap_or("");
    let foto = item.foto_url.map(str::trim).unwrap_or("");

    let mut msg = format!(
        "Olá! Encontrei este item no site da {} e gostaria de orçamento e disponibilidade.\n\n",
        site_name
    );
    msg.push_str(&format!("Item: {}\n", item.nome));
    if !codigo.is_empty() {
        msg.push_str(&format!("Código: {}\n", codigo));
    }
    msg.push_str(&format!("Link: {}\n", item.link));
    if !foto.is_empty() {
        msg.push_str(&format!("Foto: {}\n", foto));
    }
    msg.push_str("\nData do evento: \n");
    msg.push_str("Bairro/Cidade:");
    msg
}

pub fn build_whatsapp_link(number: &str, site_name: &str, item: &QuoteItem) -> String {
    format!(
        "https://wa.me/{}?text={}",
        number,
        urlencoding::encode(&quote_message(site_name, item))
    )
}

/// `{site_url}/catalogo/{secao}/{id}`
pub fn detail_link(site_url: &str, section: &str, id: &str) -> String {
    format!("{}/catalogo/{}/{}", site_url.trim_end_matches('/'), section, id)
}

/// Link genérico da página de contato
pub fn contact_link(catalog: &CatalogSettings) -> String {
    let link = format!("{}/contato", catalog.site_url.trim_end_matches('/'));
    let item = QuoteItem {
        nome: &catalog.site_name,
        codigo: Some("CONTATO"),
        link: &link,
        foto_url: None,
    };
    build_whatsapp_link(&catalog.whatsapp_number, &catalog.site_name, &item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_with_all_lines() {
        let item = QuoteItem {
            nome: "Kit Safari",
            codigo: Some("KIT-0004"),
            link: "https://viveencante.com.br/catalogo/kits/abc",
            foto_url: Some("https://res.cloudinary.com/safari.jpg"),
        };

        assert_eq!(
            quote_message("Vive Encante", &item),
            "Olá! Encontrei este item no site da Vive Encante e gostaria de orçamento e disponibilidade.\n\n\
             Item: Kit Safari\n\
             Código: KIT-0004\n\
             Link: https://viveencante.com.br/catalogo/kits/abc\n\
             Foto: https://res.cloudinary.com/safari.jpg\n\
             \nData do evento: \n\
             Bairro/Cidade:"
        );
    }

    #[test]
    fn test_blank_codigo_and_foto_are_omitted() {
        let item = QuoteItem {
            nome: "Mesa",
            codigo: Some("  "),
            link: "/catalogo/produtos/p1",
            foto_url: None,
        };

        let msg = quote_message("Vive Encante", &item);
        assert!(!msg.contains("Código:"));
        assert!(!msg.contains("Foto:"));
    }

    #[test]
    fn test_link_is_url_encoded() {
        let item = QuoteItem {
            nome: "Kit & Cia",
            link: "/x",
            ..Default::default()
        };

        let link = build_whatsapp_link("553185933480", "Vive Encante", &item);
        assert!(link.starts_with("https://wa.me/553185933480?text=Ol%C3%A1%21"));
        assert!(link.contains("Kit%20%26%20Cia"));
        assert!(!link.contains('\n'));
    }

    #[test]
    fn test_detail_link() {
        assert_eq!(
            detail_link("https://viveencante.com.br/", "kits", "abc"),
            "https://viveencante.com.br/catalogo/kits/abc"
        );
    }
}
