//! Fixed notification texts for the order lifecycle and the chat flow.

pub const CHAT_TITLE: &str = "💬 Equipo de Soporte";
pub const CHAT_FALLBACK_BODY: &str = "Te han enviado un mensaje";

pub const QUEUE_DEFAULT_TITLE: &str = "Notificación";
pub const QUEUE_DEFAULT_CHANNEL: &str = "default_channel";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub title: String,
    pub body: String,
}

/// Short order reference shown to the user instead of the full id.
pub fn order_number(order_id: &str) -> String {
    order_id.chars().take(8).collect()
}

/// Maps an order status to its notification text. Unknown statuses (and the
/// empty string) fall through to the generic update message; this never
/// fails.
pub fn order_status_content(status: &str, business_name: &str, order_id: &str) -> Content {
    let order_number = order_number(order_id);

    let (title, body) = match status {
        "confirmed" => (
            "✅ Pedido confirmado".to_string(),
            format!("{} confirmó tu pedido #{}", business_name, order_number),
        ),
        "preparing" => (
            "👨‍🍳 Preparando tu pedido".to_string(),
            format!("{} está preparando tu pedido #{}", business_name, order_number),
        ),
        "ready_for_pickup" => (
            "📦 Pedido listo".to_string(),
            format!("Tu pedido #{} está listo y esperando al repartidor", order_number),
        ),
        "on_way" => (
            "🚴 En camino".to_string(),
            format!("Tu pedido #{} viene en camino. ¡Llegará pronto!", order_number),
        ),
        "delivered" => (
            "🎊 ¡Pedido entregado!".to_string(),
            format!("Tu pedido #{} fue entregado. ¡Disfrutalo!", order_number),
        ),
        "cancelled" => (
            "❌ Pedido cancelado".to_string(),
            format!("Tu pedido #{} en {} fue cancelado", order_number, business_name),
        ),
        _ => (
            "Actualización de pedido".to_string(),
            format!("Tu pedido #{} fue actualizado", order_number),
        ),
    };

    Content { title, body }
}

/// Fixed text for a freshly created order, regardless of its stored status.
pub fn order_created_content(business_name: &str) -> Content {
    Content {
        title: "🎉 ¡Pedido recibido!".to_string(),
        body: format!(
            "Tu pedido en {} ha sido recibido. Te avisaremos cuando sea confirmado.",
            business_name
        ),
    }
}
