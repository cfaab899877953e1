use rust_decimal::Decimal;

/// (html, text) bodies for the post-payment confirmation.
pub fn payment_confirmation(order_number: &str, total: Decimal, currency: &str) -> (String, String) {
    let html = format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Order Confirmed</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; background-color: #f4f4f5; color: #18181b;">
    <table role="presentation" style="width: 100%; border-collapse: collapse;">
        <tr>
            <td style="padding: 40px 20px;">
                <table role="presentation" style="max-width: 560px; margin: 0 auto; background: #ffffff; border-radius: 12px; overflow: hidden; border: 1px solid #e4e4e7;">
                    <tr>
                        <td style="padding: 32px 40px; text-align: center; border-bottom: 1px solid #e4e4e7;">
                            <h1 style="margin: 0; font-size: 24px; font-weight: 700;">Thanks for your order! 🎉</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 32px 40px;">
                            <p style="margin: 0 0 16px; font-size: 15px; line-height: 1.6; color: #3f3f46;">
                                Your payment went through and order <strong>{order_number}</strong> is now being processed.
                            </p>
                            <div style="background: #fafafa; border: 1px solid #e4e4e7; border-radius: 8px; padding: 20px; margin-bottom: 24px;">
                                <span style="font-size: 13px; color: #71717a; text-transform: uppercase; letter-spacing: 0.5px;">Amount charged</span>
                                <p style="margin: 8px 0 0; font-size: 22px; font-weight: 700;">{total} {currency}</p>
                            </div>
                            <p style="margin: 0; font-size: 14px; line-height: 1.6; color: #71717a;">
                                We'll let you know as soon as it ships. Keep this email for your records.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"##
    );

    let text = format!(
        "Thanks for your order!\n\n\
         Your payment went through and order {order_number} is now being processed.\n\
         Amount charged: {total} {currency}\n\n\
         We'll let you know as soon as it ships."
    );

    (html, text)
}

/// (html, text) bodies for a course-enrollment confirmation.
pub fn enrollment_confirmation(course_name: &str) -> (String, String) {
    let html = format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Enrollment Confirmed</title>
</head>
<body style="margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; background-color: #f4f4f5; color: #18181b;">
    <table role="presentation" style="width: 100%; border-collapse: collapse;">
        <tr>
            <td style="padding: 40px 20px;">
                <table role="presentation" style="max-width: 560px; margin: 0 auto; background: #ffffff; border-radius: 12px; overflow: hidden; border: 1px solid #e4e4e7;">
                    <tr>
                        <td style="padding: 32px 40px; text-align: center; border-bottom: 1px solid #e4e4e7;">
                            <h1 style="margin: 0; font-size: 24px; font-weight: 700;">You're in! 🎓</h1>
                        </td>
                    </tr>
                    <tr>
                        <td style="padding: 32px 40px;">
                            <p style="margin: 0 0 16px; font-size: 15px; line-height: 1.6; color: #3f3f46;">
                                You now have full access to <strong>{course_name}</strong>. Head back to the platform to start learning.
                            </p>
                        </td>
                    </tr>
                </table>
            </td>
        </tr>
    </table>
</body>
</html>"##
    );

    let text = format!(
        "You're in!\n\n\
         You now have full access to {course_name}. Head back to the platform to start learning."
    );

    (html, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_template_carries_order_and_amount() {
        let (html, text) =
            payment_confirmation("ORD-20260806120000-ABC123", Decimal::new(6500, 2), "USD");
        assert!(html.contains("ORD-20260806120000-ABC123"));
        assert!(html.contains("65.00 USD"));
        assert!(text.contains("65.00 USD"));
    }

    #[test]
    fn enrollment_template_carries_course() {
        let (html, text) = enrollment_confirmation("Intro to Rust");
        assert!(html.contains("Intro to Rust"));
        assert!(text.contains("Intro to Rust"));
    }
}
