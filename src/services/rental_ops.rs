//! State transitions over the four rental collections.
//!
//! Every operation takes the current collections plus its inputs and leaves the
//! next collections behind. `Ok(None)` means the operation did not apply
//! (unknown id, no current user) and nothing changed. Business-rule violations
//! come back as errors and also leave everything unchanged.

use serde::{Deserialize, Serialize};

use super::clock::{IdKind, Moment};
use crate::error::{AppError, AppResult};
use crate::models::{
    AddTenantRequest, Complaint, ComplaintStatus, CreatePropertyRequest, Payment, PaymentStatus,
    PaymentType, Property, RaiseComplaintRequest, User, UserRole,
};
use crate::utils::validators::sanitize_string;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalData {
    pub properties: Vec<Property>,
    pub payments: Vec<Payment>,
    pub complaints: Vec<Complaint>,
    pub tenants: Vec<User>,
}

impl RentalData {
    pub fn property(&self, property_id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == property_id)
    }

    pub fn payment(&self, payment_id: &str) -> Option<&Payment> {
        self.payments.iter().find(|p| p.id == payment_id)
    }

    pub fn complaint(&self, complaint_id: &str) -> Option<&Complaint> {
        self.complaints.iter().find(|c| c.id == complaint_id)
    }

    pub fn tenant(&self, tenant_id: &str) -> Option<&User> {
        self.tenants.iter().find(|t| t.id == tenant_id)
    }

    /// The property a tenant currently occupies.
    pub fn property_of_tenant(&self, tenant_id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.is_occupied_by(tenant_id))
    }

    fn has_rent_for(&self, property_id: &str, month: &str) -> bool {
        self.payments.iter().any(|p| p.is_rent_for(property_id, month))
    }

    fn push_rent(&mut self, moment: &Moment, property: &Property, tenant_id: &str) -> Payment {
        let payment = Payment {
            id: moment.new_id(IdKind::Payment),
            property_id: property.id.clone(),
            tenant_id: tenant_id.to_string(),
            amount: property.rent_amount,
            month: moment.month_label(),
            status: PaymentStatus::Due,
            date_paid: None,
            payment_type: PaymentType::Rent,
            reminder_sent: None,
        };
        self.payments.push(payment.clone());
        payment
    }

    pub fn add_property(
        &mut self,
        moment: &Moment,
        actor: Option<&User>,
        req: CreatePropertyRequest,
    ) -> AppResult<Option<Property>> {
        let Some(actor) = actor else {
            return Ok(None);
        };
        if !actor.is_owner() {
            return Err(AppError::Forbidden);
        }

        let property = Property {
            id: moment.new_id(IdKind::Property),
            name: sanitize_string(&req.name),
            address: sanitize_string(&req.address),
            city: sanitize_string(&req.city),
            property_type: req.property_type,
            rent_amount: req.rent_amount,
            due_day: req.due_day,
            is_occupied: false,
            tenant_id: None,
            images: req.images,
        };
        self.properties.push(property.clone());
        Ok(Some(property))
    }

    /// Owner registers a new tenant and moves them into a vacant property.
    /// Creates this month's rent unless the property already has one.
    pub fn add_tenant(
        &mut self,
        moment: &Moment,
        property_id: &str,
        req: AddTenantRequest,
    ) -> AppResult<Option<(User, Option<Payment>)>> {
        let Some(index) = self.properties.iter().position(|p| p.id == property_id) else {
            return Ok(None);
        };
        if self.properties[index].is_occupied {
            return Err(AppError::Conflict(
                "Property already has a tenant. Remove them first.".to_string(),
            ));
        }

        let tenant = User {
            id: moment.new_id(IdKind::Tenant),
            name: sanitize_string(&req.name),
            phone: sanitize_string(&req.phone),
            role: UserRole::Tenant,
            aadhaar_number: req.aadhaar_number,
        };
        self.tenants.push(tenant.clone());
        self.properties[index].occupy(&tenant.id);

        let property = self.properties[index].clone();
        let payment = if self.has_rent_for(&property.id, &moment.month_label()) {
            None
        } else {
            Some(self.push_rent(moment, &property, &tenant.id))
        };

        Ok(Some((tenant, payment)))
    }

    /// Tenant self-service: move into a vacant property. Like [`Self::add_tenant`],
    /// no rent is created when the property was already billed this month.
    pub fn rent_property(
        &mut self,
        moment: &Moment,
        actor: Option<&User>,
        property_id: &str,
    ) -> AppResult<Option<(Property, Option<Payment>)>> {
        let Some(actor) = actor else {
            return Ok(None);
        };
        if actor.role != UserRole::Tenant {
            return Err(AppError::Forbidden);
        }
        if self.property_of_tenant(&actor.id).is_some() {
            return Err(AppError::Conflict("You already have a property.".to_string()));
        }
        let Some(index) = self.properties.iter().position(|p| p.id == property_id) else {
            return Ok(None);
        };
        if self.properties[index].is_occupied {
            return Err(AppError::Conflict(
                "This property is no longer available.".to_string(),
            ));
        }

        self.properties[index].occupy(&actor.id);
        let property = self.properties[index].clone();
        let payment = if self.has_rent_for(&property.id, &moment.month_label()) {
            None
        } else {
            Some(self.push_rent(moment, &property, &actor.id))
        };

        if self.tenant(&actor.id).is_none() {
            self.tenants.push(actor.clone());
        }

        Ok(Some((property, payment)))
    }

    /// Marks a payment paid today. Paying twice keeps the first payment date.
    pub fn pay_rent(&mut self, moment: &Moment, payment_id: &str) -> Option<Payment> {
        let payment = self.payments.iter_mut().find(|p| p.id == payment_id)?;
        if payment.status != PaymentStatus::Paid {
            payment.status = PaymentStatus::Paid;
            payment.date_paid = Some(moment.today());
        }
        Some(payment.clone())
    }

    pub fn raise_complaint(
        &mut self,
        moment: &Moment,
        actor: Option<&User>,
        req: RaiseComplaintRequest,
    ) -> AppResult<Option<Complaint>> {
        let Some(actor) = actor else {
            return Ok(None);
        };
        if actor.role != UserRole::Tenant {
            return Err(AppError::Forbidden);
        }
        let Some(home) = self.property_of_tenant(&actor.id) else {
            return Err(AppError::BadRequest(
                "No property is linked to your account.".to_string(),
            ));
        };
        if let Some(requested) = req.property_id.as_deref() {
            if requested != home.id {
                return Err(AppError::Forbidden);
            }
        }

        let complaint = Complaint {
            id: moment.new_id(IdKind::Complaint),
            tenant_id: actor.id.clone(),
            property_id: home.id.clone(),
            title: sanitize_string(&req.title),
            description: req.description,
            status: ComplaintStatus::Open,
            date: moment.today(),
            images: req.images,
        };
        self.complaints.push(complaint.clone());
        Ok(Some(complaint))
    }

    pub fn send_reminder(&mut self, payment_id: &str) -> Option<Payment> {
        let payment = self.payments.iter_mut().find(|p| p.id == payment_id)?;
        payment.reminder_sent = Some(true);
        Some(payment.clone())
    }

    /// Sets any status; forward-only progression is left to the caller.
    pub fn update_complaint_status(
        &mut self,
        complaint_id: &str,
        status: ComplaintStatus,
    ) -> Option<Complaint> {
        let complaint = self.complaints.iter_mut().find(|c| c.id == complaint_id)?;
        complaint.status = status;
        Some(complaint.clone())
    }

    pub fn advance_complaint(&mut self, complaint_id: &str) -> Option<Complaint> {
        let next = self.complaint(complaint_id)?.status.next();
        self.update_complaint_status(complaint_id, next)
    }

    /// Bills the occupant of a property for the current month.
    pub fn generate_monthly_rent(
        &mut self,
        moment: &Moment,
        property_id: &str,
    ) -> AppResult<Payment> {
        let (property, tenant_id) = self
            .property(property_id)
            .and_then(|p| p.occupant().map(|t| (p.clone(), t.to_string())))
            .ok_or_else(|| AppError::BadRequest("Property has no tenant assigned.".to_string()))?;

        let month = moment.month_label();
        if self.has_rent_for(&property.id, &month) {
            return Err(AppError::Conflict(format!(
                "Payment for {} already exists.",
                month
            )));
        }

        Ok(self.push_rent(moment, &property, &tenant_id))
    }

    /// Vacates the property and drops its tenant from the tenant list, returning
    /// the removed tenant id. Payments and complaints that reference the tenant
    /// are kept as they are.
    pub fn remove_tenant(&mut self, property_id: &str) -> Option<String> {
        let property = self.properties.iter_mut().find(|p| p.id == property_id)?;
        let tenant_id = property.tenant_id.clone()?;
        property.vacate();

        self.tenants.retain(|t| t.id != tenant_id);
        Some(tenant_id)
    }
}
