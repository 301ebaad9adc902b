//! Read-side projections for the owner and tenant dashboards. Always computed
//! from the collections as they are at call time.

use super::rental_ops::RentalData;
use crate::models::{
    Complaint, OwnerDashboard, Payment, PaymentStatus, PendingPaymentView, Property,
    PropertyOverview, TenantDashboard, User,
};

const PENDING_PREVIEW: usize = 5;

impl RentalData {
    /// Sum of paid payments billed for `month`.
    pub fn total_income(&self, month: &str) -> u64 {
        self.payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Paid && p.month == month)
            .map(|p| p.amount)
            .sum()
    }

    pub fn pending_amount(&self) -> u64 {
        self.payments
            .iter()
            .filter(|p| p.status.is_pending())
            .map(|p| p.amount)
            .sum()
    }

    pub fn pending_count(&self) -> usize {
        self.payments.iter().filter(|p| p.status.is_pending()).count()
    }

    pub fn occupied_count(&self) -> usize {
        self.properties.iter().filter(|p| p.is_occupied).count()
    }

    /// Whole-percent share of occupied properties; 0 with no properties.
    pub fn occupancy_rate(&self) -> u32 {
        let total = self.properties.len();
        if total == 0 {
            return 0;
        }
        (self.occupied_count() as f64 / total as f64 * 100.0).round() as u32
    }

    pub fn available_properties(&self) -> Vec<Property> {
        self.properties
            .iter()
            .filter(|p| !p.is_occupied)
            .cloned()
            .collect()
    }

    /// Payments billed to one tenant, latest month label first.
    pub fn payments_of_tenant(&self, tenant_id: &str) -> Vec<Payment> {
        let mut payments: Vec<Payment> = self
            .payments
            .iter()
            .filter(|p| p.tenant_id == tenant_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.month.cmp(&a.month));
        payments
    }

    /// Complaints raised by one tenant, newest first.
    pub fn complaints_of_tenant(&self, tenant_id: &str) -> Vec<Complaint> {
        let mut complaints: Vec<Complaint> = self
            .complaints
            .iter()
            .filter(|c| c.tenant_id == tenant_id)
            .cloned()
            .collect();
        complaints.sort_by(|a, b| b.date.cmp(&a.date));
        complaints
    }

    pub fn unpaid_payments(&self) -> impl Iterator<Item = &Payment> {
        self.payments
            .iter()
            .filter(|p| p.status != PaymentStatus::Paid)
    }

    pub fn owner_dashboard(&self, month: &str) -> OwnerDashboard {
        let pending_payments = self
            .unpaid_payments()
            .take(PENDING_PREVIEW)
            .map(|p| PendingPaymentView {
                payment: p.clone(),
                property_name: self.property(&p.property_id).map(|prop| prop.name.clone()),
            })
            .collect();

        OwnerDashboard {
            month: month.to_string(),
            total_income: self.total_income(month),
            pending_amount: self.pending_amount(),
            pending_count: self.pending_count(),
            occupied_count: self.occupied_count(),
            total_properties: self.properties.len(),
            occupancy_rate: self.occupancy_rate(),
            pending_payments,
            complaints: self.complaints.clone(),
        }
    }

    pub fn property_overview(&self, property_id: &str) -> Option<PropertyOverview> {
        let property = self.property(property_id)?.clone();
        let tenant = property.occupant().and_then(|id| self.tenant(id)).cloned();
        let payments = self
            .payments
            .iter()
            .filter(|p| p.property_id == property.id)
            .cloned()
            .collect();

        Some(PropertyOverview {
            property,
            tenant,
            payments,
        })
    }

    /// Everything a tenant may see. Payments and complaints are filtered by the
    /// tenant's id and nothing else.
    pub fn tenant_dashboard(&self, user: &User) -> TenantDashboard {
        let payments = self.payments_of_tenant(&user.id);
        let current_due = payments.iter().find(|p| p.status.is_pending()).cloned();

        TenantDashboard {
            my_property: self.property_of_tenant(&user.id).cloned(),
            current_due,
            payments,
            complaints: self.complaints_of_tenant(&user.id),
            available_properties: self.available_properties(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentType, RaiseComplaintRequest};
    use crate::services::rental_ops::tests::{
        flat_302, john, november, october, owner, tenant,
    };

    fn payment(id: &str, tenant_id: &str, month: &str, status: PaymentStatus, amount: u64) -> Payment {
        Payment {
            id: id.into(),
            property_id: "prop-1".into(),
            tenant_id: tenant_id.into(),
            amount,
            month: month.into(),
            status,
            date_paid: None,
            payment_type: PaymentType::Rent,
            reminder_sent: None,
        }
    }

    #[test]
    fn income_counts_only_paid_payments_of_the_month() {
        let data = RentalData {
            payments: vec![
                payment("a", "t1", "October 2023", PaymentStatus::Paid, 15000),
                payment("b", "t2", "October 2023", PaymentStatus::Due, 9000),
                payment("c", "t1", "September 2023", PaymentStatus::Paid, 15000),
                payment("d", "t3", "October 2023", PaymentStatus::Paid, 12000),
            ],
            ..Default::default()
        };

        assert_eq!(data.total_income("October 2023"), 27000);
        assert_eq!(data.total_income("November 2023"), 0);
    }

    #[test]
    fn pending_totals_include_due_and_overdue_only() {
        let data = RentalData {
            payments: vec![
                payment("a", "t1", "October 2023", PaymentStatus::Due, 100),
                payment("b", "t1", "October 2023", PaymentStatus::Overdue, 200),
                payment("c", "t1", "October 2023", PaymentStatus::Partial, 400),
                payment("d", "t1", "October 2023", PaymentStatus::Paid, 800),
            ],
            ..Default::default()
        };

        assert_eq!(data.pending_amount(), 300);
        assert_eq!(data.pending_count(), 2);
    }

    #[test]
    fn occupancy_rate_rounds_and_handles_empty() {
        let mut data = RentalData::default();
        assert_eq!(data.occupancy_rate(), 0);

        for _ in 0..3 {
            data.add_property(&october(), Some(&owner()), flat_302())
                .unwrap();
        }
        let first = data.properties[0].id.clone();
        let second = data.properties[1].id.clone();

        data.add_tenant(&october(), &first, john()).unwrap();
        assert_eq!(data.occupancy_rate(), 33);

        data.add_tenant(&october(), &second, john()).unwrap();
        assert_eq!(data.occupancy_rate(), 67);
        assert_eq!(data.available_properties().len(), 1);
    }

    #[test]
    fn tenant_views_never_show_other_tenants_records() {
        let mut data = RentalData::default();
        data.add_property(&october(), Some(&owner()), flat_302())
            .unwrap();
        data.add_property(&october(), Some(&owner()), flat_302())
            .unwrap();
        let (first, second) = (data.properties[0].id.clone(), data.properties[1].id.clone());
        let alice = tenant("alice");
        let bob = tenant("bob");
        data.rent_property(&october(), Some(&alice), &first).unwrap();
        data.rent_property(&october(), Some(&bob), &second).unwrap();
        for who in [&alice, &bob] {
            data.raise_complaint(
                &october(),
                Some(who),
                RaiseComplaintRequest {
                    title: "Water".into(),
                    description: String::new(),
                    property_id: None,
                    images: None,
                },
            )
            .unwrap();
        }

        let view = data.tenant_dashboard(&alice);

        assert_eq!(view.payments.len(), 1);
        assert!(view.payments.iter().all(|p| p.tenant_id == "alice"));
        assert_eq!(view.complaints.len(), 1);
        assert!(view.complaints.iter().all(|c| c.tenant_id == "alice"));
        assert_eq!(view.my_property.unwrap().id, first);
        assert_eq!(view.current_due.unwrap().tenant_id, "alice");
        assert!(view.available_properties.is_empty());
    }

    #[test]
    fn tenant_payments_are_sorted_by_label_descending() {
        let data = RentalData {
            payments: vec![
                payment("a", "t1", "October 2023", PaymentStatus::Paid, 1),
                payment("b", "t1", "November 2023", PaymentStatus::Due, 1),
            ],
            ..Default::default()
        };

        let months: Vec<String> = data
            .payments_of_tenant("t1")
            .into_iter()
            .map(|p| p.month)
            .collect();
        assert_eq!(months, vec!["October 2023", "November 2023"]);
    }

    #[test]
    fn owner_dashboard_previews_unpaid_payments_with_names() {
        let mut data = RentalData::default();
        data.add_property(&october(), Some(&owner()), flat_302())
            .unwrap();
        let id = data.properties[0].id.clone();
        data.add_tenant(&october(), &id, john()).unwrap();
        data.generate_monthly_rent(&november(), &id).unwrap();
        let october_rent = data.payments[0].id.clone();
        data.pay_rent(&october(), &october_rent);

        let dashboard = data.owner_dashboard("October 2023");

        assert_eq!(dashboard.total_income, 15000);
        assert_eq!(dashboard.pending_amount, 15000);
        assert_eq!(dashboard.pending_count, 1);
        assert_eq!(dashboard.occupancy_rate, 100);
        assert_eq!(dashboard.pending_payments.len(), 1);
        assert_eq!(
            dashboard.pending_payments[0].property_name.as_deref(),
            Some("Flat 302")
        );
    }

    #[test]
    fn property_overview_resolves_tenant_and_history() {
        let mut data = RentalData::default();
        data.add_property(&october(), Some(&owner()), flat_302())
            .unwrap();
        let id = data.properties[0].id.clone();
        data.add_tenant(&october(), &id, john()).unwrap();

        let overview = data.property_overview(&id).unwrap();
        assert_eq!(overview.tenant.unwrap().name, "John");
        assert_eq!(overview.payments.len(), 1);

        data.remove_tenant(&id);
        let overview = data.property_overview(&id).unwrap();
        assert!(overview.tenant.is_none());
        assert_eq!(overview.payments.len(), 1);
        assert!(data.property_overview("prop-missing").is_none());
    }
}
